use std::{
    fs::File,
    io::BufReader,
    path::Path,
};

use failure::{Error, ResultExt};
use plydoc::Reader;


pub mod convert;
pub mod info;


/// Opens the file and parses its PLY header.
fn open(path: &Path) -> Result<Reader<BufReader<File>>, Error> {
    let reader = Reader::open(path)
        .context(format!("failed to read PLY header of '{}'", path.display()))?;

    Ok(reader)
}

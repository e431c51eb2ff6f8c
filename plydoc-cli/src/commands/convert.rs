use std::time::Instant;

use failure::{bail, Error, ResultExt};
use plydoc::Config;

use crate::{
    args::{GlobalArgs, ConvertArgs},
    commands::open,
};

pub fn run(_global_args: &GlobalArgs, args: &ConvertArgs) -> Result<(), Error> {
    let start_time = Instant::now();

    if args.target.exists() && !args.force {
        bail!(
            "target file '{}' already exists (use '--force' to overwrite it)",
            args.target.display(),
        );
    }

    // Only native byte order can be written
    let encoding = args.target_encoding.encoding();
    if encoding.is_binary() && encoding != plydoc::Encoding::binary_native() {
        bail!(
            "cannot write '{}': only the byte order of this machine ('{}') is supported",
            encoding,
            plydoc::Encoding::binary_native(),
        );
    }

    // ----- Load -----------------------------------------------------------
    let before_load = Instant::now();
    let reader = open(&args.source)?;
    info!("Source encoding: {}", reader.encoding());

    let mut config = Config::new(encoding);
    if !args.drop_comments {
        for comment in reader.comments() {
            config = config.add_comment(comment.as_str());
        }
    }
    for comment in &args.comments {
        if comment.contains('\n') {
            bail!("header comments must not contain line breaks");
        }
        config = config.add_comment(comment.as_str());
    }

    let doc = progress!(["Reading '{}'", args.source.display()] => {
        reader.read().context("could not read source file")?
    });
    let load_time = before_load.elapsed();


    // ----- Write ----------------------------------------------------------
    info!("Target encoding: {}", encoding);

    let before_write = Instant::now();
    progress!(["Writing '{}'", args.target.display()] => {
        config.write_to_file(&args.target, &doc).context("could not write target file")?;
    });
    let write_time = before_write.elapsed();

    info!(
        "Processing time: {:.2?} ({:.2?} loading, {:.2?} writing)",
        start_time.elapsed(),
        load_time,
        write_time,
    );

    Ok(())
}

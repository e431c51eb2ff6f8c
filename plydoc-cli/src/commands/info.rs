use failure::{Error, ResultExt};
use term_painter::{Color, ToStyle};
use plydoc::{
    pack::to_point_cloud,
    Document, Reader, ScalarType,
};

use crate::{
    args::{GlobalArgs, InfoArgs},
    commands::open,
    ui,
};

pub fn run(_global_args: &GlobalArgs, args: &InfoArgs) -> Result<(), Error> {
    let reader = open(&args.file)?;

    println!(
        "File format: {} (encoding: {})",
        Color::BrightWhite.bold().paint("PLY"),
        Color::BrightWhite.paint(reader.encoding()),
    );
    print_comments(&reader);

    if args.header_only {
        print_elements(reader.header());
        return Ok(());
    }

    let doc = progress!(["Reading '{}'", args.file.display()] => {
        reader.read().context("failed to read PLY body")?
    });

    print_elements(&doc);
    print_positions(&doc, args.values)?;

    Ok(())
}

fn print_comments<R: std::io::BufRead>(reader: &Reader<R>) {
    for comment in reader.comments() {
        println!("  {} {}", Color::White.dim().paint("comment"), comment);
    }
}

/// Prints all elements with their record count and all properties with type
/// and number of values.
fn print_elements(doc: &Document) {
    let element_style = Color::White.bold();
    let count_style = Color::Green.bold();
    let prop_style = Color::BrightBlue.bold();

    println!();
    for (name, element) in doc.elements() {
        println!(
            "{} ({} records)",
            element_style.paint(name),
            count_style.paint(ui::fmt_with_thousand_sep(element.count() as u64)),
        );

        for (prop_name, prop) in element.properties() {
            let list = if prop.is_list() { "list of " } else { "" };
            println!(
                "    {: <12} {}{} ({} values)",
                prop_name,
                list,
                prop_style.paint(prop.scalar_type()),
                ui::fmt_with_thousand_sep(prop.len() as u64),
            );
        }
    }
    println!();
}

/// Prints the first `max` vertex positions, if there are any.
fn print_positions(doc: &Document, max: usize) -> Result<(), Error> {
    let ty = match doc.element("vertex").and_then(|v| v.property("x")) {
        Some(x) if max > 0 => x.scalar_type(),
        _ => return Ok(()),
    };

    let points: Vec<[f64; 3]> = match ty {
        ScalarType::Float => {
            to_point_cloud::<f32>(doc)?
                .into_iter()
                .map(|[x, y, z]| [f64::from(x), f64::from(y), f64::from(z)])
                .collect()
        }
        ScalarType::Double => to_point_cloud::<f64>(doc)?,
        other => {
            warn!("vertex positions have non floating point type '{}', not printing them", other);
            return Ok(());
        }
    };

    info!("First {} of {} vertex positions:", max.min(points.len()), points.len());
    for [x, y, z] in points.iter().take(max) {
        println!("    {} {} {}", x, y, z);
    }

    Ok(())
}

//! Measures PLY IO read (parse) and write speeds.

use std::io::Cursor;
use criterion::{
    criterion_group, criterion_main, black_box, BenchmarkId, Criterion, Throughput,
};

use plydoc::{
    pack::unpack,
    Config, Document, ElementArray, PropertyArray, Reader,
};


// ===============================================================================================
// ===== Helper utilities
// ===============================================================================================

/// Number of vertices along one side of the generated grid.
const GRID: u32 = 200;

/// Creates a triangulated `GRID` x `GRID` height field with positions,
/// normals and a face element.
fn grid_document() -> Document {
    let mut points = Vec::new();
    let mut normals = Vec::new();
    for y in 0..GRID {
        for x in 0..GRID {
            let (fx, fy) = (x as f32 / GRID as f32, y as f32 / GRID as f32);
            points.push([fx, fy, (fx * 6.0).sin() * (fy * 6.0).cos()]);
            normals.push([0.0f32, 0.0, 1.0]);
        }
    }

    let mut faces = Vec::new();
    for y in 0..GRID - 1 {
        for x in 0..GRID - 1 {
            let i = y * GRID + x;
            faces.push([i, i + 1, i + GRID]);
            faces.push([i + 1, i + GRID + 1, i + GRID]);
        }
    }

    let mut vertex = ElementArray::new(points.len());
    let names = ["x", "y", "z", "nx", "ny", "nz"];
    let columns = IntoIterator::into_iter(unpack(&points))
        .chain(IntoIterator::into_iter(unpack(&normals)));
    for (name, column) in names.iter().zip(columns) {
        vertex.add_property(*name, column).unwrap();
    }

    let mut face = ElementArray::new(faces.len());
    face.add_property("vertex_indices", PropertyArray::from_lists(&faces)).unwrap();

    let mut doc = Document::new();
    doc.add_element("vertex", vertex).unwrap();
    doc.add_element("face", face).unwrap();
    doc
}

fn configs() -> Vec<(&'static str, Config)> {
    vec![("ascii", Config::ascii()), ("binary", Config::binary())]
}


// ===============================================================================================
// ===== Benchmarks
// ===============================================================================================

fn read_grid(c: &mut Criterion) {
    let doc = grid_document();
    let mut group = c.benchmark_group("ply_read_grid");

    for (name, config) in configs() {
        let data = config.write_to_memory(&doc).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let doc = Reader::new(Cursor::new(data)).unwrap().read().unwrap();
                black_box(doc)
            })
        });
    }

    group.finish();
}

fn read_header(c: &mut Criterion) {
    let data = Config::binary().write_to_memory(&grid_document()).unwrap();

    c.bench_function("ply_read_header", |b| {
        b.iter(|| black_box(Reader::new(Cursor::new(&data)).unwrap()))
    });
}

fn write_grid(c: &mut Criterion) {
    let doc = grid_document();
    let mut group = c.benchmark_group("ply_write_grid");

    for (name, config) in configs() {
        let len = config.write_to_memory(&doc).unwrap().len();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| {
                let mut out = Vec::with_capacity(len);
                config.clone().into_writer(&mut out).write(&doc).unwrap();
                black_box(out)
            })
        });
    }

    group.finish();
}


criterion_group!(benches, read_grid, read_header, write_grid);
criterion_main!(benches);

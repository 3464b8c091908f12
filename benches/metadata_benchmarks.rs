//! Benchmarking for metadata methods: parsing OME-XML
//! with many series and reporting their stage positions.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use criterion::BenchmarkId;
use rand::Rng;
use stagepos;

/// An OME-XML document with `n_series` images, each with
/// `n_planes` planes at random stage positions.
fn random_ome_xml(n_series : usize, n_planes : usize) -> String {
    let mut rng = rand::thread_rng();
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">"#
    );
    for series in 0..n_series {
        xml.push_str(&format!(r#"<Image ID="Image:{series}"><Pixels ID="Pixels:{series}">"#));
        let (x, y) : (f64, f64) = (rng.gen_range(-5e4..5e4), rng.gen_range(-5e4..5e4));
        for plane in 0..n_planes {
            xml.push_str(&format!(
                r#"<Plane TheZ="{plane}" TheC="0" TheT="0" PositionX="{x}" PositionXUnit="µm" PositionY="{y}" PositionYUnit="µm"/>"#
            ));
        }
        xml.push_str("</Pixels></Image>");
    }
    xml.push_str("</OME>");
    xml
}

fn criterion_benchmark_metadata(c : &mut Criterion) {
    let mut parse_bench = c.benchmark_group("Parse OME-XML");
    for n_series in [16usize, 256, 4096] {
        let xml = random_ome_xml(n_series, 8);
        parse_bench.bench_with_input(
            BenchmarkId::new("Series with 8 planes", n_series),
            &xml,
            |bench, xml| {
                bench.iter(|| black_box(stagepos::parse_metadata(xml).unwrap()))
            },
        );
    }
    parse_bench.finish();

    let metadata = stagepos::parse_metadata(&random_ome_xml(4096, 1)).unwrap();
    let mut report_bench = c.benchmark_group("Report positions");
    report_bench.bench_function("Report 4096 series", |bench| {
        bench.iter(|| {
            let mut lines = Vec::<String>::with_capacity(2 * 4096);
            stagepos::report(&metadata, None, &mut lines).unwrap();
            black_box(lines)
        })
    });
    report_bench.finish();
}

criterion_group!(benches, criterion_benchmark_metadata);
criterion_main!(benches);

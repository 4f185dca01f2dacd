use criterion::{criterion_group, criterion_main, Criterion};
use schema::RecordSchema;

/// One full-arity feed line with every identifier column populated, so the
/// parse exercises all of the set transforms.
const FEED_LINE: &str = "mdp.39015012345678\tallow\tpd\t990012345\t\tMIU\t005138825\t1172208\t0394404289\t0317-8471\t75-619154\tTitle of record\tImprint Pub.\tbib\t2009-01-08 09:30:17\t0\t2008\tmiu\teng\tBK\tMIU\tumich\tumich\tgoogle\topen\tAuthor, Some";

fn parse_line_benchmark(c: &mut Criterion) {
    let schema = RecordSchema::hathifile();
    c.bench_function("parse_full_arity_line", |b| {
        b.iter(|| schema.parse(FEED_LINE).unwrap().unwrap());
    });
}

fn projection_render_benchmark(c: &mut Criterion) {
    let schema = RecordSchema::hathifile();
    let record = schema.parse(FEED_LINE).unwrap().unwrap();
    c.bench_function("render_projection_line", |b| {
        b.iter(|| record.projection_line());
    });
}

criterion_group!(benches, parse_line_benchmark, projection_render_benchmark);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use stage_codec::{
    read_entities, write_entities, ByteReader, CodecConfig, Entity, Schema, SchemaRegistry, Value,
};

const ACTOR_TEMPLATE: &str = "\
Actor
Id U32
Position VEC3
Pose TRANSFORM
Label STRING
PartCount U8
Parts STRUCT [PartCount]
  Kind U16
  Offset F32
}
";

fn actor_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.insert(Schema::parse(ACTOR_TEMPLATE).expect("template must parse"));
    registry
}

fn sample_stream(registry: &SchemaRegistry, config: &CodecConfig, count: usize) -> Vec<u8> {
    let schema = registry.get("Actor").expect("registered");
    let mut entities = Vec::with_capacity(count);
    for index in 0..count {
        let mut entity = Entity::instantiate(schema);
        let id = entity.member("Id").expect("id");
        entity
            .members
            .set_value(id, Value::U32(index as u32))
            .expect("id value");
        let label = entity.member("Label").expect("label");
        entity
            .members
            .set_value(label, Value::Str(format!("actor_{index}")))
            .expect("label value");
        let parts = entity.member("PartCount").expect("part count");
        entity
            .members
            .set_value(parts, Value::U8(3))
            .expect("part count value");
        entities.push(entity);
    }
    write_entities(&entities, config).expect("stream must serialize")
}

fn bench_template_parse(c: &mut Criterion) {
    c.bench_function("schema_parse_actor", |b| {
        b.iter(|| Schema::parse(ACTOR_TEMPLATE).expect("template must parse"));
    });
}

fn bench_stream_read(c: &mut Criterion) {
    let registry = actor_registry();
    let config = CodecConfig::default();
    let stream = sample_stream(&registry, &config, 64);

    c.bench_function("read_64_entities", |b| {
        b.iter(|| read_entities(&stream, &registry, &config).expect("stream must parse"));
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let registry = actor_registry();
    let config = CodecConfig::default();
    let stream = sample_stream(&registry, &config, 8);

    c.bench_function("round_trip_8_entities", |b| {
        b.iter_batched(
            || stream.clone(),
            |bytes| {
                let entities =
                    read_entities(&bytes, &registry, &config).expect("stream must parse");
                write_entities(&entities, &config).expect("stream must serialize")
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_single_record(c: &mut Criterion) {
    let registry = actor_registry();
    let config = CodecConfig::default();
    let stream = sample_stream(&registry, &config, 1);

    c.bench_function("read_one_entity", |b| {
        b.iter(|| {
            let mut reader = ByteReader::new(&stream);
            Entity::read(&mut reader, &registry, &config).expect("record must parse")
        });
    });
}

criterion_group!(
    benches,
    bench_template_parse,
    bench_stream_read,
    bench_round_trip,
    bench_single_record
);
criterion_main!(benches);

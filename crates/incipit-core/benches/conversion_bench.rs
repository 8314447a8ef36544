use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use incipit_core::{ConversionSettings, IncipitConverter};
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A chapter-like document with one cited sentence per paragraph.
fn synthetic_docx(paragraphs: usize) -> Vec<u8> {
    let mut body = String::new();
    let mut notes = String::new();
    for i in 1..=paragraphs {
        body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">Paragraph {i} opens plainly. Then it argues </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>a cited point</w:t></w:r><w:r><w:t>.</w:t></w:r><w:r><w:rPr><w:rStyle w:val="EndnoteReference"/></w:rPr><w:endnoteReference w:id="{i}"/></w:r></w:p>"#
        ));
        notes.push_str(&format!(
            r#"<w:endnote w:id="{i}"><w:p><w:r><w:t>Source {i}.</w:t></w:r></w:p></w:endnote>"#
        ));
    }

    let entries = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#
                .to_string(),
        ),
        (
            "word/document.xml",
            format!(r#"<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#),
        ),
        (
            "word/endnotes.xml",
            format!(r#"<w:endnotes xmlns:w="{W_NS}">{notes}</w:endnotes>"#),
        ),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn conversion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("incipit_converter");
    let settings = ConversionSettings::default();

    for (name, paragraphs) in [("Small", 10), ("Chapter", 200), ("Book", 2000)] {
        let bytes = synthetic_docx(paragraphs);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.sample_size(10);

        group.bench_function(format!("convert/{name}"), |b| {
            b.iter(|| IncipitConverter::convert(&bytes, &settings).unwrap())
        });
        group.bench_function(format!("preview/{name}"), |b| {
            b.iter(|| IncipitConverter::preview(&bytes, &settings).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, conversion_benchmark);
criterion_main!(benches);

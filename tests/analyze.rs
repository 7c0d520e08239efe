use anyhow::anyhow;
use mp4ttml::render::{CollectSink, ImageSink, NullSink, PngDirSink};
use mp4ttml::source::{FileSource, MemorySource};
use mp4ttml::{AnalyzeError, ParseError, analyze, analyze_source};
use serde_json::Value;

const SMPTE_NS: &str = "http://www.smpte-ra.org/schemas/2052-1/2010/smpte-tt";

fn bx(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((body.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(body);
    v
}

fn ttml(images: &[&str]) -> Vec<u8> {
    let imgs: String = images
        .iter()
        .map(|d| format!(r#"<smpte:image imagetype="PNG" encoding="Base64">{d}</smpte:image>"#))
        .collect();
    format!(r#"<tt xmlns:smpte="{SMPTE_NS}"><head><metadata>{imgs}</metadata></head></tt>"#).into_bytes()
}

/// styp, moof[ mfhd, traf[ tfhd, tfdt ] ], mdat(payload)
fn segment(payload: &[u8]) -> Vec<u8> {
    let traf = bx(b"traf", &[bx(b"tfhd", &[0; 8]), bx(b"tfdt", &[0; 8])].concat());
    let moof = bx(b"moof", &[bx(b"mfhd", &[0, 0, 0, 0, 0, 0, 0, 1]), traf].concat());
    [bx(b"styp", b"msdhmsix"), moof, bx(b"mdat", payload)].concat()
}

struct FailingSink;

impl ImageSink for FailingSink {
    fn render(&mut self, _mime_type: &str, _base64_data: &str) -> anyhow::Result<()> {
        Err(anyhow!("display went away"))
    }
}

#[test]
fn segment_images_reach_the_sink() {
    let data = segment(&ttml(&["iVBORw0KGgo=", "AAAA"]));
    let mut sink = CollectSink::default();

    let analysis = analyze(&data, &mut sink).expect("analyze failed");

    let types: Vec<String> = analysis.boxes.iter().map(|b| b.typ.to_string()).collect();
    assert_eq!(types, ["styp", "mfhd", "tfhd", "tfdt", "mdat"]);
    assert_eq!(analysis.consumed, data.len());
    assert_eq!(analysis.rendered, 2);
    assert_eq!(analysis.images().count(), 2);

    assert_eq!(
        sink.images,
        vec![
            ("image/png".to_string(), "iVBORw0KGgo=".to_string()),
            ("image/png".to_string(), "AAAA".to_string()),
        ]
    );
}

#[test]
fn bad_payload_does_not_stop_the_walk() {
    let data = [
        bx(b"mdat", b"<tt><unclosed></tt>"),
        bx(b"free", &[]),
        bx(b"mdat", &ttml(&["AAAA"])),
    ]
    .concat();
    let mut sink = CollectSink::default();

    let analysis = analyze(&data, &mut sink).expect("analyze failed");

    assert_eq!(analysis.boxes.len(), 3);
    assert_eq!(analysis.boxes[0].images.as_deref(), Some(&[][..]));
    assert!(analysis.boxes[1].images.is_none());
    assert_eq!(analysis.rendered, 1);
    assert_eq!(sink.images.len(), 1);
}

#[test]
fn structural_error_aborts_the_analysis() {
    let mut data = segment(&ttml(&["AAAA"]));
    data.truncate(data.len() - 3);

    let err = analyze(&data, &mut NullSink).unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Structure(ParseError::TruncatedBuffer { .. })
    ));
}

#[test]
fn render_failure_names_the_image() {
    let data = segment(&ttml(&["AAAA"]));

    let err = analyze(&data, &mut FailingSink).unwrap_err();
    match err {
        AnalyzeError::Render { index, source } => {
            assert_eq!(index, 0);
            assert_eq!(source.to_string(), "display went away");
        }
        other => panic!("expected render error, got {other}"),
    }
}

#[test]
fn missing_file_is_an_acquisition_error() {
    let path = std::env::temp_dir().join("mp4ttml_does_not_exist.mp4");
    let err = analyze_source(&FileSource::new(&path), &mut NullSink).unwrap_err();
    assert!(matches!(err, AnalyzeError::Acquire(_)));
    assert!(err.to_string().starts_with("could not acquire input"));
}

#[test]
fn memory_source_round_trips() {
    let data = segment(&ttml(&["AAAA"]));
    let analysis = analyze_source(&MemorySource(data.clone()), &mut NullSink).expect("analyze failed");
    assert_eq!(analysis.consumed, data.len());
    assert_eq!(analysis.rendered, 1);
}

#[test]
fn analysis_serializes_to_json() {
    let data = segment(&ttml(&["AAAA"]));
    let analysis = analyze(&data, &mut NullSink).expect("analyze failed");

    let v: Value = serde_json::to_value(&analysis).expect("serialize failed");
    let boxes = v["boxes"].as_array().expect("boxes array");
    assert_eq!(boxes[0]["typ"], "styp");
    assert_eq!(boxes[0]["offset"], 0);
    assert_eq!(boxes[0]["size"], 16);
    assert_eq!(boxes[0]["full_name"], "Segment Type Box");
    assert!(boxes[0].get("images").is_none());

    let mdat = &boxes[4];
    assert_eq!(mdat["typ"], "mdat");
    assert_eq!(mdat["images"][0]["encoding"], "Base64");
    assert_eq!(mdat["images"][0]["encoded_data"], "AAAA");
}

#[test]
fn png_dir_sink_writes_decoded_files() {
    let dir = std::env::temp_dir().join("mp4ttml_png_dir_sink_test");
    let _ = std::fs::remove_dir_all(&dir);

    let data = segment(&ttml(&["iVBORw0KGgo="]));
    let mut sink = PngDirSink::new(&dir).expect("create sink failed");
    analyze(&data, &mut sink).expect("analyze failed");

    assert_eq!(sink.written().len(), 1);
    let bytes = std::fs::read(&sink.written()[0]).expect("read image failed");
    assert_eq!(bytes, [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
}

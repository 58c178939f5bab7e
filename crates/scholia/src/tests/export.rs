use super::*;
use crate::research::{ResearchRequest, ResearchResult};

#[test]
fn test_file_name_collapses_whitespace() {
    assert_eq!(
        export_file_name("O Impacto  da\tIA"),
        "O_Impacto_da_IA.docx"
    );
    assert_eq!(export_file_name("  Clima  "), "Clima.docx");
    assert_eq!(export_file_name(" \n "), "document.docx");
}

#[test]
fn test_file_name_replaces_path_separators() {
    assert_eq!(
        export_file_name("HIV/SIDA em Moçambique"),
        "HIV_SIDA_em_Moçambique.docx"
    );
    assert_eq!(export_file_name("../../x"), ".._.._x.docx");
    assert_eq!(export_file_name(r"a\b: c?"), "a_b__c_.docx");
    assert_eq!(export_file_name(".."), "document.docx");
    assert_eq!(export_file_name(" . "), "document.docx");
}

#[test]
fn test_save_slashed_topic_in_dir() {
    let mut metadata = metadata(vec![]);
    metadata.title = "HIV/SIDA em Moçambique".into();
    let doc = Exporter::default()
        .export_markup("<p>x</p>", &metadata)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = doc.save_in(dir.path()).unwrap();
    assert_eq!(path.parent().unwrap(), dir.path());
    assert_eq!(path.file_name().unwrap(), "HIV_SIDA_em_Moçambique.docx");
    assert!(path.is_file());
}

#[test]
fn test_export_markup() {
    let doc = Exporter::default()
        .export_markup("<h1>T</h1><p>x</p>", &metadata(vec![]))
        .unwrap();
    assert_eq!(doc.file_name, "Alterações_climáticas.docx");
    assert!(doc.bytes.starts_with(b"PK"));
}

#[test]
fn test_export_empty_content() {
    let doc = Exporter::default()
        .export_markup("", &metadata(vec![]))
        .unwrap();
    assert!(!doc.bytes.is_empty());
}

#[test]
fn test_export_stored_result_and_save() {
    let result = ResearchResult {
        id: "abc123xyz".into(),
        content: "<h1>Energia</h1><p>Texto <em>longo</em></p>".into(),
        sources: vec![GroundingSource::new("A", "https://a.example")],
        request: ResearchRequest::new("Energia renovável"),
        timestamp: 0,
        user_id: "u".into(),
    };
    let doc = Exporter::new(Config::default().compose_options())
        .export(&result)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = doc.save_in(&dir.path().join("out")).unwrap();
    assert_eq!(path.file_name().unwrap(), "Energia_renovável.docx");
    assert_eq!(std::fs::read(&path).unwrap(), doc.bytes);
}

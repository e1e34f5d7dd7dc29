//! Session behaviour through the public API. No pdfium, no network.

use edgequake_pdfqa::pipeline::extract::apply_fallback;
use edgequake_pdfqa::pipeline::ocr::OcrText;
use edgequake_pdfqa::pipeline::postprocess::split_answer;
use edgequake_pdfqa::{
    export_tables, Answer, AnswerSegment, AuthState, Credentials, DocQaError, Extraction,
    ExtractionMethod, Secrets, Session,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

fn answer(question: &str, raw: &str) -> Answer {
    Answer {
        question: question.into(),
        raw: raw.into(),
        segments: split_answer(raw),
        input_tokens: 10,
        output_tokens: 5,
        duration_ms: 1,
        retries: 0,
    }
}

fn extraction(name: &str, text: &str, method: ExtractionMethod) -> Extraction {
    Extraction {
        file_name: name.into(),
        content_hash: edgequake_pdfqa::pipeline::input::content_hash(text.as_bytes()),
        text: text.into(),
        method,
        page_count: 1,
        duration_ms: 1,
    }
}

#[tokio::test]
async fn scanned_document_flow() {
    let ocr_calls = AtomicUsize::new(0);
    let counter = &ocr_calls;
    let (text, method) = apply_fallback("scan.pdf", "   ".into(), move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut out = OcrText::default();
        out.push_page(1, "Total due: 1,200");
        Ok(out)
    })
    .await
    .unwrap();
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);

    let mut session = Session::new(AuthState::open());
    let doc = session.load_document(extraction("scan.pdf", &text, method));
    assert!(doc.used_ocr());
    assert!(doc.text().starts_with("\n--- Page 1 ---\n"));
}

#[tokio::test]
async fn blank_scan_is_reported_not_loaded() {
    let err = apply_fallback("blank-scan.pdf", String::new(), || async {
        let mut out = OcrText::default();
        out.push_page(1, "");
        out.push_page(2, "  \n ");
        Ok(out)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, DocQaError::NoTextExtracted { .. }));
    assert!(err.to_string().contains("blank-scan.pdf"));
}

#[test]
fn new_upload_clears_history_and_identity_is_by_content() {
    let mut session = Session::new(AuthState::open());
    session.load_document(extraction("a.pdf", "alpha", ExtractionMethod::TextLayer));
    session.record(answer("q1", "a1")).unwrap();
    session.record(answer("q2", "a2")).unwrap();
    assert_eq!(session.history().len(), 2);
    assert!(!session.is_current("a.pdf"));
    assert!(session.is_current(&edgequake_pdfqa::pipeline::input::content_hash(b"alpha")));

    session.load_document(extraction("b.pdf", "beta", ExtractionMethod::TextLayer));
    assert!(session.history().is_empty());
    assert_eq!(session.document().unwrap().text(), "beta");
}

#[test]
fn gated_session_with_secrets_credentials() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(b"api_key = \"k\"\n[auth]\nusername = \"analyst\"\npassword = \"pw\"\n")
        .unwrap();
    let secrets = Secrets::load(tmp.path()).unwrap();

    let mut session = Session::new(AuthState::new(secrets.credentials(), false));
    assert!(session.auth().requires_login());
    assert!(matches!(
        session.login("analyst", "nope"),
        Err(DocQaError::InvalidCredentials)
    ));
    session.login("analyst", "pw").unwrap();
    assert_eq!(session.auth().username(), Some("analyst"));
}

#[test]
fn credentials_compare_exactly() {
    let c = Credentials::new("user", "pass");
    assert!(c.verify("user", "pass"));
    assert!(!c.verify("user", "pass\n"));
}

#[test]
fn table_answer_renders_and_exports() {
    let raw = "Schedule below.\n```csv\nmilestone,date\nBid opens,2024-05-01\nBid closes,2024-05-20\n```";
    let a = answer("When?", raw);

    let kinds: Vec<&str> = a
        .segments
        .iter()
        .map(|s| match s {
            AnswerSegment::Prose { .. } => "prose",
            AnswerSegment::Table { .. } => "table",
        })
        .collect();
    assert_eq!(kinds, vec!["prose", "table"]);

    let md = a.to_markdown();
    assert!(md.contains("| milestone | date |"));
    assert!(md.contains("| Bid closes | 2024-05-20 |"));

    let dir = tempfile::tempdir().unwrap();
    let paths = export_tables(&a, dir.path(), "tender.pdf").unwrap();
    assert_eq!(paths.len(), 1);
    let csv = std::fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(csv, "milestone,date\nBid opens,2024-05-01\nBid closes,2024-05-20\n");
}

#[test]
fn answer_serialises_to_json() {
    let a = answer("q", "```csv\na,b\n1,2\n```");
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["segments"][0]["kind"], "table");
    assert_eq!(json["segments"][0]["table"]["headers"][1], "b");
}

use httpmock::prelude::*;
use tempfile::TempDir;
use ulcer_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, OllamaClient, UlcerPipeline};

const NOTES_CSV: &str = "mrn,note\n\
A-1,\"NOTE-ALPHA: central ulcer 3x3mm in visual axis, deep stromal infiltrate\"\n\
A-2,NOTE-BRAVO: peripheral infiltrate at 2 o'clock\n\
A-3,\"NOTE-CHARLIE: descemetocele, Seidel negative\"\n";

fn config(output_path: &str) -> CliConfig {
    CliConfig {
        input_path: "notes.csv".to_string(),
        output_path: output_path.to_string(),
        note_column: "note".to_string(),
        ollama_endpoint: String::new(),
        model: "llama3.2:1b".to_string(),
        verbose: false,
        monitor: false,
        dry_run: false,
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "llama3.2:1b",
        "created_at": "2024-11-01T10:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
}

fn valid_content(centrality: u8, depth: u8, thinning: u8) -> String {
    serde_json::json!({
        "ulcer_centrality": centrality,
        "reason_for_ulcer_centrality": "from note",
        "ulcer_depth": depth,
        "reason_for_ulcer_depth": "from note",
        "corneal_thinning": thinning,
        "reason_for_corneal_thinning": ""
    })
    .to_string()
}

fn setup(temp_dir: &TempDir) -> LocalStorage {
    std::fs::write(temp_dir.path().join("notes.csv"), NOTES_CSV).unwrap();
    LocalStorage::new(temp_dir.path())
}

fn read_output(temp_dir: &TempDir, name: &str) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(temp_dir.path().join(name)).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_skips_unparsable_row() {
    let temp_dir = TempDir::new().unwrap();
    let storage = setup(&temp_dir);

    let server = MockServer::start();
    let alpha = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-ALPHA");
        then.status(200).json_body(chat_reply(&valid_content(1, 1, 9)));
    });
    let bravo = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-BRAVO");
        then.status(200)
            .json_body(chat_reply("The ulcer is peripheral, so centrality is 0."));
    });
    let charlie = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-CHARLIE");
        then.status(200).json_body(chat_reply(&valid_content(9, 9, 1)));
    });

    let mut config = config("results/extracted_ulcer_parameters.csv");
    config.ollama_endpoint = server.base_url();
    let client = OllamaClient::new(server.base_url());
    let pipeline = UlcerPipeline::new(storage, config, client);
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run().await.unwrap();

    alpha.assert();
    bravo.assert();
    charlie.assert();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.elapsed_minutes() >= 0.0);
    assert_eq!(summary.output_path, "results/extracted_ulcer_parameters.csv");

    let header = std::fs::read_to_string(
        temp_dir.path().join("results/extracted_ulcer_parameters.csv"),
    )
    .unwrap();
    assert!(header.starts_with(
        "ulcer_centrality,reason_for_ulcer_centrality,ulcer_depth,reason_for_ulcer_depth,corneal_thinning,reason_for_corneal_thinning,note_id,note\n"
    ));

    let rows = read_output(&temp_dir, "results/extracted_ulcer_parameters.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][6], "1");
    assert_eq!(
        rows[0][7],
        "NOTE-ALPHA: central ulcer 3x3mm in visual axis, deep stromal infiltrate"
    );
    assert_eq!(rows[1][0], "9");
    assert_eq!(rows[1][4], "1");
    assert_eq!(rows[1][5], "");
    assert_eq!(rows[1][6], "3");
}

#[tokio::test]
async fn test_out_of_range_code_is_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let storage = setup(&temp_dir);

    let server = MockServer::start();
    let out_of_range = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-BRAVO");
        then.status(200).json_body(chat_reply(&valid_content(0, 0, 10)));
    });
    let others = [
        server.mock(|when, then| {
            when.method(POST).path("/api/chat").body_contains("NOTE-ALPHA");
            then.status(200).json_body(chat_reply(&valid_content(1, 0, 0)));
        }),
        server.mock(|when, then| {
            when.method(POST).path("/api/chat").body_contains("NOTE-CHARLIE");
            then.status(200).json_body(chat_reply(&valid_content(1, 0, 0)));
        }),
    ];

    let client = OllamaClient::new(server.base_url());
    let pipeline = UlcerPipeline::new(storage, config("out.csv"), client);
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    out_of_range.assert();
    others.iter().for_each(|mock| mock.assert());
    assert_eq!(summary.processed, 2);

    let ids: Vec<String> = read_output(&temp_dir, "out.csv")
        .into_iter()
        .map(|row| row[6].clone())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_rerun_fully_replaces_output() {
    let temp_dir = TempDir::new().unwrap();
    let storage = setup(&temp_dir);
    std::fs::write(temp_dir.path().join("out.csv"), "stale,content\n1,2\n3,4\n5,6\n7,8\n").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(200).json_body(chat_reply(&valid_content(1, 0, 9)));
    });

    for _ in 0..2 {
        let client = OllamaClient::new(server.base_url());
        let pipeline = UlcerPipeline::new(storage.clone(), config("out.csv"), client);
        EtlEngine::new(pipeline).run().await.unwrap();
    }

    let content = std::fs::read_to_string(temp_dir.path().join("out.csv")).unwrap();
    assert!(!content.contains("stale"));
    assert_eq!(read_output(&temp_dir, "out.csv").len(), 3);
}

#[tokio::test]
async fn test_service_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let storage = setup(&temp_dir);

    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-ALPHA");
        then.status(200).json_body(chat_reply(&valid_content(1, 1, 1)));
    });
    let crash = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-BRAVO");
        then.status(500)
            .json_body(serde_json::json!({"error": "llama runner process has terminated"}));
    });
    let never = server.mock(|when, then| {
        when.method(POST).path("/api/chat").body_contains("NOTE-CHARLIE");
        then.status(200).json_body(chat_reply(&valid_content(1, 1, 1)));
    });

    let client = OllamaClient::new(server.base_url());
    let pipeline = UlcerPipeline::new(storage, config("out.csv"), client);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    first.assert();
    crash.assert();
    never.assert_hits(0);
    match err {
        EtlError::InferenceError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "llama runner process has terminated");
        }
        other => panic!("expected InferenceError, got {:?}", other),
    }
    assert!(!temp_dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn test_missing_note_column_aborts_before_inference() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("notes.csv"), "mrn,text\n1,hello\n").unwrap();
    let storage = LocalStorage::new(temp_dir.path());

    let server = MockServer::start();
    let chat = server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(200).json_body(chat_reply(&valid_content(1, 1, 1)));
    });

    let client = OllamaClient::new(server.base_url());
    let pipeline = UlcerPipeline::new(storage, config("out.csv"), client);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    chat.assert_hits(0);
    assert!(matches!(err, EtlError::MissingColumnError { .. }));
    assert!(!temp_dir.path().join("out.csv").exists());
}

//! End-to-end tests for the word completion server.
//!
//! These tests exercise the full LSP protocol stack using tower-lsp's
//! in-process service, sending JSON-RPC requests and verifying responses.

use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use tower::{Service, ServiceExt};
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::LspService;

use word_lsp_server::WordLspBackend;

fn initialize_request(id: i64, root_uri: Option<&str>, options: serde_json::Value) -> Request {
    Request::build("initialize")
        .params(json!({
            "capabilities": {},
            "rootUri": root_uri,
            "initializationOptions": options
        }))
        .id(id)
        .finish()
}

fn initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

fn shutdown_request(id: i64) -> Request {
    Request::build("shutdown").id(id).finish()
}

fn did_open_notification(uri: &str, text: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "markdown",
                "version": 1,
                "text": text
            }
        }))
        .finish()
}

fn did_close_notification(uri: &str) -> Request {
    Request::build("textDocument/didClose")
        .params(json!({ "textDocument": { "uri": uri } }))
        .finish()
}

fn completion_request(id: i64, uri: &str, line: u32, character: u32) -> Request {
    Request::build("textDocument/completion")
        .params(json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        }))
        .id(id)
        .finish()
}

fn execute_command_request(id: i64, command: &str, arguments: serde_json::Value) -> Request {
    Request::build("workspace/executeCommand")
        .params(json!({
            "command": command,
            "arguments": arguments
        }))
        .id(id)
        .finish()
}

/// Helper to extract the "result" field from a JSON-RPC response.
fn extract_result(response: Option<Response>) -> serde_json::Value {
    let resp = response.expect("expected a response");
    let serialized = serde_json::to_value(&resp).unwrap();
    serialized.get("result").cloned().unwrap_or(json!(null))
}

fn labels(result: &serde_json::Value) -> Vec<String> {
    result
        .get("items")
        .and_then(|items| items.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("label").and_then(|l| l.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn call(service: &mut LspService<WordLspBackend>, request: Request) -> Option<Response> {
    service.ready().await.unwrap().call(request).await.unwrap()
}

async fn start(
    root_uri: Option<&str>,
    options: serde_json::Value,
) -> LspService<WordLspBackend> {
    let (mut service, socket) = LspService::new(WordLspBackend::new);

    // Drain server→client messages so client.log_message() etc. don't block.
    tokio::spawn(async move {
        socket.collect::<Vec<_>>().await;
    });

    call(&mut service, initialize_request(1, root_uri, options)).await;
    call(&mut service, initialized_notification()).await;
    service
}

#[tokio::test(flavor = "current_thread")]
async fn test_initialize_and_shutdown() {
    let (mut service, socket) = LspService::new(WordLspBackend::new);
    tokio::spawn(async move {
        socket.collect::<Vec<_>>().await;
    });

    let resp = call(&mut service, initialize_request(1, None, json!(null))).await;
    let result = extract_result(resp);
    let capabilities = result.get("capabilities").expect("expected capabilities");
    assert!(capabilities.get("completionProvider").is_some());
    let commands = capabilities["executeCommandProvider"]["commands"]
        .as_array()
        .expect("expected commands");
    assert!(commands.contains(&json!("wordLsp.triggerManually")));
    assert_eq!(
        result["serverInfo"]["name"].as_str(),
        Some("word-lsp"),
        "expected server name 'word-lsp'"
    );

    let resp = call(&mut service, initialized_notification()).await;
    assert!(
        resp.is_none(),
        "initialized is a notification, no response expected"
    );

    let resp = call(&mut service, shutdown_request(2)).await;
    assert!(resp.is_some(), "shutdown should return a response");
}

#[tokio::test(flavor = "current_thread")]
async fn test_completes_words_from_current_file() {
    let mut service = start(None, json!(null)).await;
    let uri = "file:///notes/today.md";
    call(
        &mut service,
        did_open_notification(uri, "hello world\nhelp wanted\nhel"),
    )
    .await;

    let result = extract_result(call(&mut service, completion_request(2, uri, 2, 3)).await);
    assert_eq!(result["isIncomplete"], json!(true));
    let got = labels(&result);
    assert!(got.contains(&"hello".to_string()), "got {:?}", got);
    assert!(got.contains(&"help".to_string()), "got {:?}", got);
    assert!(!got.contains(&"world".to_string()));
    assert!(!got.contains(&"hel".to_string()), "typed token came back: {:?}", got);

    let item = result["items"]
        .as_array()
        .and_then(|items| items.iter().find(|i| i["label"] == json!("hello")))
        .cloned()
        .expect("hello item");
    assert_eq!(item["textEdit"]["newText"], json!("hello "));
    assert_eq!(item["textEdit"]["range"]["start"], json!({"line": 2, "character": 0}));
    assert_eq!(item["textEdit"]["range"]["end"], json!({"line": 2, "character": 3}));
    assert_eq!(item["command"]["command"], json!("wordLsp.suggestionSelected"));

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_current_file_follows_requested_document() {
    let mut service = start(None, json!(null)).await;
    let a = "file:///notes/a.md";
    let b = "file:///notes/b.md";
    call(&mut service, did_open_notification(a, "xylophone\nxyl")).await;
    call(&mut service, did_open_notification(b, "xylem\nxyl")).await;

    let got = labels(&extract_result(call(&mut service, completion_request(2, a, 1, 3)).await));
    assert_eq!(got, vec!["xylophone".to_string()]);

    let got = labels(&extract_result(call(&mut service, completion_request(3, b, 1, 3)).await));
    assert_eq!(got, vec!["xylem".to_string()]);

    // Closing the indexed document must not leave its words behind.
    call(&mut service, did_close_notification(b)).await;
    let got = labels(&extract_result(call(&mut service, completion_request(4, a, 1, 3)).await));
    assert_eq!(got, vec!["xylophone".to_string()]);

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_toggle_match_strategy() {
    let mut service = start(None, json!(null)).await;
    let uri = "file:///notes/travel.md";
    call(&mut service, did_open_notification(uri, "yorkshire\nork")).await;

    let result = extract_result(call(&mut service, completion_request(2, uri, 1, 3)).await);
    assert!(labels(&result).is_empty(), "prefix matching, got {}", result);

    let resp = call(
        &mut service,
        execute_command_request(3, "wordLsp.toggleMatchStrategy", json!([])),
    )
    .await;
    assert_eq!(extract_result(resp), json!("partial"));

    let result = extract_result(call(&mut service, completion_request(4, uri, 1, 3)).await);
    assert_eq!(labels(&result), vec!["yorkshire".to_string()]);

    let resp = call(
        &mut service,
        execute_command_request(5, "wordLsp.toggleMatchStrategy", json!([])),
    )
    .await;
    assert_eq!(extract_result(resp), json!("prefix"));

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_front_matter_line_never_completes() {
    let mut service = start(None, json!(null)).await;
    let uri = "file:///notes/post.md";
    call(&mut service, did_open_notification(uri, "---title\ntitle")).await;

    let result = extract_result(call(&mut service, completion_request(2, uri, 0, 8)).await);
    assert!(result.is_null(), "expected no completion, got {}", result);

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_manual_trigger_when_automatic_is_off() {
    let mut service = start(None, json!({"complementAutomatically": false})).await;
    let uri = "file:///notes/birds.md";
    call(&mut service, did_open_notification(uri, "heron\nher")).await;

    let result = extract_result(call(&mut service, completion_request(2, uri, 1, 3)).await);
    assert!(result.is_null(), "automatic completion is off");

    let resp = call(
        &mut service,
        execute_command_request(3, "wordLsp.triggerManually", json!([])),
    )
    .await;
    assert!(resp.is_some());

    let result = extract_result(call(&mut service, completion_request(4, uri, 1, 3)).await);
    assert!(labels(&result).contains(&"heron".to_string()));

    // While the list is open it keeps refreshing without a manual trigger.
    let result = extract_result(call(&mut service, completion_request(5, uri, 1, 3)).await);
    assert!(labels(&result).contains(&"heron".to_string()));

    // Selecting closes the session after the close delay.
    call(
        &mut service,
        execute_command_request(6, "wordLsp.suggestionSelected", json!([])),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let result = extract_result(call(&mut service, completion_request(7, uri, 1, 3)).await);
    assert!(result.is_null(), "expected closed session, got {}", result);

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_dictionary_and_internal_links() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let dictionary = root.join("words.txt");
    std::fs::write(&dictionary, "tortoise\tslow reptile\ttortue\n").unwrap();
    std::fs::write(root.join("Tokyo.md"), "---\naliases: [Edo]\n---\n").unwrap();

    let root_uri = format!("file://{}", root.display());
    let options = json!({
        "enableCustomDictionaryComplement": true,
        "customDictionaryPaths": [dictionary.display().to_string()],
        "maxNumberOfSuggestions": 10,
        "minNumberOfCharactersTriggered": 2
    });
    let mut service = start(Some(&root_uri), options).await;

    let uri = format!("{}/journal.md", root_uri);
    call(&mut service, did_open_notification(&uri, "visit to")).await;

    let result = extract_result(call(&mut service, completion_request(2, &uri, 0, 8)).await);
    let got = labels(&result);
    assert!(got.contains(&"tortoise".to_string()), "got {:?}", got);
    assert!(got.contains(&"[[Tokyo]]".to_string()), "got {:?}", got);

    let tortoise = result["items"]
        .as_array()
        .and_then(|items| items.iter().find(|i| i["label"] == json!("tortoise")))
        .cloned()
        .expect("tortoise item");
    assert_eq!(tortoise["detail"], json!("slow reptile"));

    call(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_set_ime_state_rejects_bad_argument() {
    let mut service = start(None, json!(null)).await;

    let resp = call(
        &mut service,
        execute_command_request(2, "wordLsp.setImeState", json!(["on"])),
    )
    .await;
    let serialized = serde_json::to_value(resp.expect("expected a response")).unwrap();
    assert!(serialized.get("error").is_some(), "got {}", serialized);

    let resp = call(
        &mut service,
        execute_command_request(3, "wordLsp.setImeState", json!([true])),
    )
    .await;
    assert!(extract_result(resp).is_null());

    call(&mut service, shutdown_request(99)).await;
}

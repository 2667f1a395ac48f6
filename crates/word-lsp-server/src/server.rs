//! LSP server implementation: the LanguageServer trait.

use crate::commands::{self, PredictableCompleteArgs};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::ls_types::*;
use tower_lsp::{Client, LanguageServer};
use word_lsp_completion::debounce::Debouncer;
use word_lsp_completion::predictable::predictable_complete;
use word_lsp_completion::query::{collect_phrase_suggestions, parse_query};
use word_lsp_completion::selection::{compute_insertion, render_label, SelectionContext};
use word_lsp_completion::trigger::{SuggestSession, TriggerOutcome};
use word_lsp_index::current_file::index_current_file;
use word_lsp_index::custom_dictionary::index_custom_dictionaries;
use word_lsp_index::internal_link::index_internal_links;
use word_lsp_index::WordIndexStore;
use word_lsp_text::{create_tokenizer, Document, Tokenizer};
use word_lsp_types::{EditorPosition, Settings, SourceKind, Word};

/// Section name used when the client nests settings in didChangeConfiguration.
const SETTINGS_SECTION: &str = "wordLsp";

/// Everything derived from one version of the settings.
struct ServerConfig {
    settings: Settings,
    tokenizer: Arc<dyn Tokenizer>,
    suggest_debouncer: Debouncer,
    close_debouncer: Arc<Debouncer>,
}

impl ServerConfig {
    fn new(settings: Settings) -> Self {
        ServerConfig {
            tokenizer: create_tokenizer(settings.strategy),
            suggest_debouncer: Debouncer::new(settings.delay()),
            close_debouncer: Arc::new(Debouncer::new(settings.close_delay())),
            settings,
        }
    }
}

/// Document and cursor the current-file index was last built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CurrentFileSource {
    uri: String,
    cursor: Option<EditorPosition>,
}

/// Main LSP backend holding all state.
pub struct WordLspBackend {
    client: Client,
    /// Open documents (URI string → Document).
    documents: Arc<DashMap<String, Document>>,
    /// One word index per source.
    indexes: Arc<WordIndexStore>,
    config: RwLock<Arc<ServerConfig>>,
    /// Touched from the close timer too, so behind a std mutex that is
    /// never held across an await.
    session: Arc<StdMutex<SuggestSession>>,
    /// Workspace root path (set during initialize).
    workspace_root: Mutex<Option<PathBuf>>,
    current_file: Mutex<Option<CurrentFileSource>>,
}

fn lock_session(session: &StdMutex<SuggestSession>) -> MutexGuard<'_, SuggestSession> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

impl WordLspBackend {
    pub fn new(client: Client) -> Self {
        WordLspBackend {
            client,
            documents: Arc::new(DashMap::new()),
            indexes: Arc::new(WordIndexStore::new()),
            config: RwLock::new(Arc::new(ServerConfig::new(Settings::default()))),
            session: Arc::new(StdMutex::new(SuggestSession::new())),
            workspace_root: Mutex::new(None),
            current_file: Mutex::new(None),
        }
    }

    async fn config(&self) -> Arc<ServerConfig> {
        self.config.read().await.clone()
    }

    async fn apply_settings(&self, settings: Settings) {
        tracing::info!(
            "Settings: strategy={:?} match={:?} max={} delay={}ms",
            settings.strategy,
            settings.match_strategy,
            settings.max_number_of_suggestions,
            settings.delay_milli_seconds
        );
        *self.config.write().await = Arc::new(ServerConfig::new(settings));
    }

    /// Rebuild the current-file index from `uri`, leaving out the token
    /// being typed at `cursor`.
    async fn refresh_current_file_index(&self, uri: &str, cursor: Option<EditorPosition>) {
        let config = self.config().await;
        let settings = &config.settings;
        let mut current = self.current_file.lock().await;
        if !settings.enable_current_file_complement {
            self.indexes.clear(SourceKind::CurrentFile);
            *current = None;
            return;
        }

        let start = std::time::Instant::now();
        let index = {
            let Some(document) = self.documents.get(uri) else {
                return;
            };
            let exclude = cursor.and_then(|position| {
                config
                    .tokenizer
                    .tokenize(&document.line_until(position), true)
                    .pop()
                    .filter(|token| !token.is_empty())
            });
            index_current_file(
                &document.text(),
                config.tokenizer.as_ref(),
                exclude.as_deref(),
                settings.only_complement_english_on_current_file_complement,
            )
        };
        self.indexes.replace(SourceKind::CurrentFile, index);
        *current = Some(CurrentFileSource {
            uri: uri.to_string(),
            cursor,
        });

        if settings.show_log_about_performance_in_console {
            tracing::debug!(
                "Index current file tokens: {}[ms]",
                start.elapsed().as_millis()
            );
        }
    }

    async fn refresh_custom_dictionary_index(&self) {
        let config = self.config().await;
        let settings = &config.settings;
        if !settings.enable_custom_dictionary_complement {
            self.indexes.clear(SourceKind::CustomDictionary);
            return;
        }

        let start = std::time::Instant::now();
        let paths = settings.custom_dictionary_paths.clone();
        let delimiter = settings.column_delimiter;
        let pattern = settings.custom_dictionary_word_regex_pattern.clone();
        let built = tokio::task::spawn_blocking(move || {
            index_custom_dictionaries(&paths, delimiter, &pattern)
        })
        .await;

        match built {
            Ok(Ok(index)) => {
                tracing::info!("Indexed {} custom dictionary words", index.len());
                self.indexes.replace(SourceKind::CustomDictionary, index);
            }
            Ok(Err(e)) => {
                tracing::warn!("Custom dictionary indexing failed: {}", e);
                self.client
                    .log_message(MessageType::WARNING, format!("Custom dictionary: {}", e))
                    .await;
                self.indexes.clear(SourceKind::CustomDictionary);
            }
            Err(e) => {
                tracing::error!("Custom dictionary task panicked: {}", e);
            }
        }

        if settings.show_log_about_performance_in_console {
            tracing::debug!(
                "Index custom dictionary tokens: {}[ms]",
                start.elapsed().as_millis()
            );
        }
    }

    async fn refresh_internal_link_index(&self) {
        let config = self.config().await;
        let settings = &config.settings;
        let root = self.workspace_root.lock().await.clone();
        let Some(root) = root.filter(|_| settings.enable_internal_link_complement) else {
            self.indexes.clear(SourceKind::InternalLink);
            return;
        };

        let start = std::time::Instant::now();
        let exclude = settings.exclude_internal_link_path_prefix_patterns.clone();
        let built =
            tokio::task::spawn_blocking(move || index_internal_links(&root, &exclude)).await;

        match built {
            Ok(index) => {
                tracing::info!("Indexed {} internal links", index.len());
                self.indexes.replace(SourceKind::InternalLink, index);
            }
            Err(e) => {
                tracing::error!("Internal link task panicked: {}", e);
            }
        }

        if settings.show_log_about_performance_in_console {
            tracing::debug!(
                "Index internal link tokens: {}[ms]",
                start.elapsed().as_millis()
            );
        }
    }

    /// Make the current-file index describe `uri` with the token at
    /// `cursor` left out, rebuilding only when it does not already.
    async fn ensure_current_file_index(&self, uri: &str, cursor: EditorPosition) {
        let wanted = CurrentFileSource {
            uri: uri.to_string(),
            cursor: Some(cursor),
        };
        let fresh = self.current_file.lock().await.as_ref() == Some(&wanted);
        if fresh {
            return;
        }
        self.refresh_current_file_index(uri, Some(cursor)).await;
    }

    /// Drop the current-file index if it was built from `uri`.
    async fn forget_current_file(&self, uri: &str) {
        let mut current = self.current_file.lock().await;
        if current.as_ref().is_some_and(|source| source.uri == uri) {
            self.indexes.clear(SourceKind::CurrentFile);
            *current = None;
        }
    }

    async fn refresh_all_indexes(&self) {
        let current = self.current_file.lock().await.clone();
        match current {
            Some(source) if self.documents.contains_key(&source.uri) => {
                self.refresh_current_file_index(&source.uri, source.cursor)
                    .await;
            }
            _ => {
                self.indexes.clear(SourceKind::CurrentFile);
                *self.current_file.lock().await = None;
            }
        }
        self.refresh_custom_dictionary_index().await;
        self.refresh_internal_link_index().await;
    }

    async fn run_predictable_complete(&self, args: PredictableCompleteArgs) -> Result<()> {
        let config = self.config().await;
        let cursor = to_editor_position(args.position);
        let completion = {
            let Some(document) = self.documents.get(&args.uri) else {
                tracing::debug!("predictableComplete: {} is not open", args.uri);
                return Ok(());
            };
            predictable_complete(&document, cursor, config.tokenizer.as_ref())
        };
        let Some(completion) = completion else {
            return Ok(());
        };

        let uri: Uri = args
            .uri
            .parse()
            .map_err(|_| tower_lsp::jsonrpc::Error::invalid_params("Invalid uri"))?;
        let edit = TextEdit::new(
            Range::new(
                to_lsp_position(completion.start),
                to_lsp_position(completion.end),
            ),
            completion.text,
        );
        let changes = HashMap::from([(uri, vec![edit])]);
        if let Err(e) = self
            .client
            .apply_edit(WorkspaceEdit {
                changes: Some(changes),
                ..Default::default()
            })
            .await
        {
            tracing::warn!("predictableComplete: applyEdit failed: {}", e);
        }
        Ok(())
    }
}

fn to_editor_position(position: Position) -> EditorPosition {
    EditorPosition::new(position.line, position.character)
}

fn to_lsp_position(position: EditorPosition) -> Position {
    Position::new(position.line, position.ch)
}

/// Where the cursor lands after `text` is inserted at `start`.
fn position_after(start: EditorPosition, text: &str) -> EditorPosition {
    match text.rsplit_once('\n') {
        Some((head, tail)) => EditorPosition::new(
            start.line + head.matches('\n').count() as u32 + 1,
            tail.chars().count() as u32,
        ),
        None => EditorPosition::new(start.line, start.ch + text.chars().count() as u32),
    }
}

/// Settings sent either flat or nested under [`SETTINGS_SECTION`].
fn parse_settings(value: &serde_json::Value) -> Option<Settings> {
    let value = value.get(SETTINGS_SECTION).unwrap_or(value);
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring invalid settings: {}", e);
            None
        }
    }
}

fn completion_item(
    word: &Word,
    rank: usize,
    settings: &Settings,
    context: &SelectionContext,
    line: &[char],
) -> CompletionItem {
    let insertion = compute_insertion(word, context, settings);
    let (new_text, format) = match insertion.caret_offset {
        Some(_) => (insertion.snippet(), InsertTextFormat::SNIPPET),
        None => (insertion.text.clone(), InsertTextFormat::PLAIN_TEXT),
    };
    // Filter on exactly the text being replaced so the client keeps the
    // server's ranking instead of re-filtering by label.
    let replaced: String = line
        .get(insertion.start.ch as usize..insertion.end.ch as usize)
        .unwrap_or_default()
        .iter()
        .collect();

    CompletionItem {
        label: render_label(word, settings),
        kind: Some(if word.internal_link {
            CompletionItemKind::REFERENCE
        } else {
            CompletionItemKind::TEXT
        }),
        detail: word.description.clone(),
        sort_text: Some(format!("{:05}", rank)),
        filter_text: Some(replaced),
        insert_text_format: Some(format),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
            Range::new(to_lsp_position(insertion.start), to_lsp_position(insertion.end)),
            new_text,
        ))),
        command: Some(Command {
            title: String::new(),
            command: commands::SUGGESTION_SELECTED.to_string(),
            arguments: None,
        }),
        data: serde_json::to_value(word).ok(),
        ..Default::default()
    }
}

impl LanguageServer for WordLspBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("word-lsp: initialize");

        #[allow(deprecated)]
        let root_path = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri_to_path(uri.as_str()))
            .or_else(|| params.root_path.as_ref().map(PathBuf::from));
        if let Some(ref root) = root_path {
            tracing::info!("Workspace root: {}", root.display());
            *self.workspace_root.lock().await = Some(root.clone());
        }

        if let Some(settings) = params.initialization_options.as_ref().and_then(parse_settings) {
            self.apply_settings(settings).await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: commands::ALL.iter().map(|c| c.to_string()).collect(),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "word-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("word-lsp: initialized");
        self.client
            .log_message(MessageType::INFO, "word-lsp server initialized")
            .await;

        self.refresh_custom_dictionary_index().await;
        self.refresh_internal_link_index().await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("word-lsp: shutdown");
        Ok(())
    }

    // --- Document Synchronization ---

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();
        tracing::debug!("didOpen: {}", uri_str);

        self.documents
            .insert(uri_str.clone(), Document::new(&params.text_document.text));
        self.refresh_current_file_index(&uri_str, None).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();
        tracing::debug!("didChange: {}", uri_str);

        let mut cursor = None;
        if let Some(mut document) = self.documents.get_mut(&uri_str) {
            for change in &params.content_changes {
                if let Some(range) = change.range {
                    let start = to_editor_position(range.start);
                    document.apply_edit(start, to_editor_position(range.end), &change.text);
                    cursor = Some(position_after(start, &change.text));
                } else {
                    // Full content replacement
                    document.set_text(&change.text);
                    cursor = None;
                }
            }
        }

        self.refresh_current_file_index(&uri_str, cursor).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();
        tracing::debug!("didClose: {}", uri_str);
        self.documents.remove(&uri_str);
        self.forget_current_file(&uri_str).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri_str = params.text_document.uri.as_str().to_string();
        tracing::debug!("didSave: {}", uri_str);
        self.refresh_current_file_index(&uri_str, None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        tracing::debug!("didChangeConfiguration");
        let Some(settings) = parse_settings(&params.settings) else {
            return;
        };
        self.apply_settings(settings).await;
        self.refresh_all_indexes().await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri_str = params
            .text_document_position
            .text_document
            .uri
            .as_str()
            .to_string();
        let pos = params.text_document_position.position;
        tracing::debug!("completion: {}:{}:{}", uri_str, pos.line, pos.character);

        let cursor = to_editor_position(pos);
        let line: Vec<char> = match self.documents.get(&uri_str) {
            Some(document) => document.line(cursor.line as usize).chars().collect(),
            None => return Ok(None),
        };
        let cursor = EditorPosition::new(cursor.line, cursor.ch.min(line.len() as u32));
        let line_until: String = line[..cursor.ch as usize].iter().collect();

        self.ensure_current_file_index(&uri_str, cursor).await;

        let config = self.config().await;
        let settings = &config.settings;

        let outcome = {
            let mut session = lock_session(&self.session);
            let refreshing = params.context.as_ref().is_some_and(|c| {
                c.trigger_kind == CompletionTriggerKind::TRIGGER_FOR_INCOMPLETE_COMPLETIONS
            });
            if refreshing {
                session.set_open(true);
            }
            let outcome = session.on_trigger(cursor, &line_until, settings, config.tokenizer.as_ref());
            if matches!(outcome, TriggerOutcome::Suppressed(_)) {
                session.set_open(false);
            }
            outcome
        };
        let TriggerOutcome::Active(info) = outcome else {
            return Ok(None);
        };

        let start = std::time::Instant::now();
        let indexed = self.indexes.snapshot();
        let words = config
            .suggest_debouncer
            .run(|| {
                let tokens = parse_query(&info.query);
                collect_phrase_suggestions(&indexed, &tokens, settings, config.tokenizer.as_ref())
            })
            .await;
        let Some(words) = words else {
            tracing::debug!("completion superseded by a newer request");
            return Ok(Some(CompletionResponse::List(CompletionList {
                is_incomplete: true,
                items: vec![],
            })));
        };

        if settings.show_log_about_performance_in_console {
            tracing::debug!("Get suggestions: {}[ms]", start.elapsed().as_millis());
        }

        let context = SelectionContext::from(&info);
        let items: Vec<CompletionItem> = words
            .iter()
            .enumerate()
            .map(|(rank, word)| completion_item(word, rank, settings, &context, &line))
            .collect();
        lock_session(&self.session).set_open(!items.is_empty());

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: true,
            items,
        })))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        tracing::debug!("executeCommand: {}", params.command);

        match params.command.as_str() {
            commands::TRIGGER_MANUALLY => {
                lock_session(&self.session).arm_manual();
            }
            commands::SET_IME_STATE => {
                let active: bool = commands::first_arg(&params.command, &params.arguments)?;
                lock_session(&self.session).set_ime_active(active);
            }
            commands::SUGGESTION_SELECTED => {
                let session = self.session.clone();
                self.config().await.close_debouncer.schedule(move || {
                    lock_session(&session).set_open(false);
                });
            }
            commands::PREDICTABLE_COMPLETE => {
                let args: PredictableCompleteArgs =
                    commands::first_arg(&params.command, &params.arguments)?;
                self.run_predictable_complete(args).await?;
            }
            commands::REFRESH_INDEXES => {
                self.refresh_all_indexes().await;
            }
            commands::TOGGLE_MATCH_STRATEGY => {
                let mut settings = self.config().await.settings.clone();
                settings.match_strategy = settings.match_strategy.toggled();
                let strategy = settings.match_strategy;
                self.apply_settings(settings).await;
                return Ok(serde_json::to_value(strategy).ok());
            }
            other => {
                return Err(tower_lsp::jsonrpc::Error::invalid_params(format!(
                    "Unknown command: {}",
                    other
                )));
            }
        }
        Ok(None)
    }
}

/// Convert a file:// URI to a filesystem path.
fn uri_to_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(PathBuf::from)
}

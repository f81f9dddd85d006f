//! # Agent Module
//!
//! The conversational assistant that sits next to the balance adapter. It
//! owns a window of recent messages, an optional knowledge store, and a
//! language-model backend. The application constructs it and passes it to
//! the CLI session and the HTTP handlers; nothing here is global.

pub mod knowledge;
pub mod memory;
pub mod model;
pub mod prompts;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use knowledge::KnowledgeStore;
pub use memory::WindowBufferMemory;
pub use model::{AgentError, Backend, ChatMessage, LanguageModel, OfflineModel, OpenAiChat};

/// Marks the retrieved knowledge section inside the system message.
pub const KNOWLEDGE_HEADER: &str = "Relevant knowledge:";

const KNOWLEDGE_CHUNKS_PER_PROMPT: usize = 3;

pub struct Agent<M> {
    preamble: String,
    model: M,
    memory: Mutex<WindowBufferMemory>,
    // HTTP conversations, keyed by client-chosen session id
    sessions: Mutex<HashMap<String, Arc<Mutex<WindowBufferMemory>>>>,
    knowledge: Option<KnowledgeStore>,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(preamble: String, model: M, memory: WindowBufferMemory) -> Self {
        Self {
            preamble,
            model,
            memory: Mutex::new(memory),
            sessions: Mutex::new(HashMap::new()),
            knowledge: None,
        }
    }

    pub fn with_knowledge(mut self, store: Option<KnowledgeStore>) -> Self {
        self.knowledge = store;
        self
    }

    pub fn has_knowledge(&self) -> bool {
        self.knowledge.is_some()
    }

    pub async fn history_len(&self) -> usize {
        self.memory.lock().await.len()
    }

    fn system_message(&self, input: &str) -> ChatMessage {
        let hits = self
            .knowledge
            .as_ref()
            .map(|store| store.search(input, KNOWLEDGE_CHUNKS_PER_PROMPT))
            .unwrap_or_default();
        if hits.is_empty() {
            return ChatMessage::system(self.preamble.clone());
        }
        debug!(chunks = hits.len(), "adding knowledge context");
        ChatMessage::system(format!(
            "{}\n\n{}\n{}",
            self.preamble,
            KNOWLEDGE_HEADER,
            hits.join("\n\n")
        ))
    }

    /// Sends `input` with the preamble, retrieved knowledge and recent
    /// history. The turn is remembered only if the model answers.
    pub async fn prompt(&self, input: &str) -> Result<String, AgentError> {
        let mut memory = self.memory.lock().await;
        self.run_turn(&mut memory, input).await
    }

    /// Like [`Agent::prompt`], but against the history of `session` instead
    /// of the agent's own conversation. Without a session id the turn is
    /// answered with no history and nothing is remembered.
    pub async fn prompt_session(&self, session: Option<&str>, input: &str) -> Result<String, AgentError> {
        let Some(id) = session else {
            let mut scratch = WindowBufferMemory::new(0);
            return self.run_turn(&mut scratch, input).await;
        };
        let memory = {
            let window = self.memory.lock().await.window();
            let mut sessions = self.sessions.lock().await;
            Arc::clone(
                sessions
                    .entry(id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(WindowBufferMemory::new(window)))),
            )
        };
        let mut memory = memory.lock().await;
        self.run_turn(&mut memory, input).await
    }

    async fn run_turn(&self, memory: &mut WindowBufferMemory, input: &str) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(memory.len() + 2);
        messages.push(self.system_message(input));
        messages.extend(memory.messages().cloned());
        messages.push(ChatMessage::user(input));

        match self.model.complete(&messages).await {
            Ok(reply) => {
                memory.push(ChatMessage::user(input));
                memory.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "language model call failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct ScriptedModel {
        seen: StdMutex<Vec<Vec<ChatMessage>>>,
        fail: bool,
    }

    impl LanguageModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(messages.to_vec());
            if self.fail {
                return Err(AgentError::EmptyReply);
            }
            Ok(format!("reply {}", seen.len()))
        }
    }

    #[tokio::test]
    async fn history_is_replayed_on_next_prompt() {
        let agent = Agent::new("be brief".into(), ScriptedModel::default(), WindowBufferMemory::new(10));
        assert_eq!(agent.prompt("first").await.unwrap(), "reply 1");
        assert_eq!(agent.prompt("second").await.unwrap(), "reply 2");

        let seen = agent.model.seen.lock().unwrap();
        let contents: Vec<_> = seen[1].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["be brief", "first", "reply 1", "second"]);
        assert_eq!(seen[1][2].role, model::Role::Assistant);
        drop(seen);
        assert_eq!(agent.history_len().await, 4);
    }

    #[tokio::test]
    async fn failed_turns_are_not_remembered() {
        let model = ScriptedModel { fail: true, ..Default::default() };
        let agent = Agent::new("p".into(), model, WindowBufferMemory::new(10));
        assert!(agent.prompt("hello").await.is_err());
        assert_eq!(agent.history_len().await, 0);
    }

    #[tokio::test]
    async fn sessions_keep_separate_histories() {
        let agent = Agent::new("p".into(), ScriptedModel::default(), WindowBufferMemory::new(10));
        agent.prompt_session(Some("alice"), "alice secret").await.unwrap();
        agent.prompt_session(Some("bob"), "hi").await.unwrap();
        agent.prompt_session(Some("alice"), "again").await.unwrap();
        agent.prompt_session(None, "anonymous").await.unwrap();

        let seen = agent.model.seen.lock().unwrap();
        let contents = |turn: usize| -> Vec<String> { seen[turn].iter().map(|m| m.content.clone()).collect() };
        assert_eq!(contents(1), ["p", "hi"]);
        assert_eq!(contents(2), ["p", "alice secret", "reply 1", "again"]);
        assert_eq!(contents(3), ["p", "anonymous"]);
        drop(seen);
        // the CLI conversation is untouched
        assert_eq!(agent.history_len().await, 0);
    }

    #[tokio::test]
    async fn knowledge_is_added_to_system_message() {
        let store = KnowledgeStore::from_text("## Gas\nMetis pays gas in METIS.\n\n## Other\nUnrelated.");
        let agent = Agent::new("p".into(), ScriptedModel::default(), WindowBufferMemory::new(10))
            .with_knowledge(Some(store));
        assert!(agent.has_knowledge());
        agent.prompt("what token pays gas").await.unwrap();

        let seen = agent.model.seen.lock().unwrap();
        let system = &seen[0][0].content;
        assert!(system.contains(KNOWLEDGE_HEADER));
        assert!(system.contains("Metis pays gas in METIS."));
        assert!(!system.contains("Unrelated."));
    }
}

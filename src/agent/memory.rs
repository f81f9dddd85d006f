use std::collections::VecDeque;

use super::model::ChatMessage;

/// Keeps the most recent `window` messages of the conversation.
#[derive(Debug, Clone)]
pub struct WindowBufferMemory {
    window: usize,
    messages: VecDeque<ChatMessage>,
}

impl WindowBufferMemory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            messages: VecDeque::with_capacity(window),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.window {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for WindowBufferMemory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_beyond_window() {
        let mut memory = WindowBufferMemory::new(3);
        for i in 0..5 {
            memory.push(ChatMessage::user(format!("m{}", i)));
        }
        let kept: Vec<_> = memory.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(kept, ["m2", "m3", "m4"]);
    }

    #[test]
    fn zero_window_keeps_nothing() {
        let mut memory = WindowBufferMemory::new(0);
        memory.push(ChatMessage::user("hello"));
        assert!(memory.is_empty());
    }
}

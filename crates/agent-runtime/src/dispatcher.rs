//! Rendering of retrieved thread messages
//!
//! Text parts are returned as-is. Image files produced by the agent (charts
//! from the code interpreter) are downloaded, written to a fixed local path
//! and handed to an [`ImageRenderer`].

use agent_service::{AgentService, Message, MessageContent, Role};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, RunError};

/// Displays a saved image
pub trait ImageRenderer: Send + Sync {
    fn render(&self, path: &Path) -> Result<()>;
}

/// Renderer that only reports where the image was saved
pub struct LogRenderer;

impl ImageRenderer for LogRenderer {
    fn render(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Image saved");
        Ok(())
    }
}

/// One content part after dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchedContent {
    Text { role: Role, text: String },
    Image { role: Role, file_id: String, path: PathBuf },
    Other { role: Role, repr: String },
}

impl DispatchedContent {
    pub fn role(&self) -> Role {
        match self {
            DispatchedContent::Text { role, .. }
            | DispatchedContent::Image { role, .. }
            | DispatchedContent::Other { role, .. } => *role,
        }
    }
}

/// Walks message content parts in service order
pub struct ContentDispatcher {
    service: Arc<dyn AgentService>,
    image_path: PathBuf,
    renderer: Arc<dyn ImageRenderer>,
}

impl ContentDispatcher {
    /// Create a dispatcher saving images to `image_path`
    pub fn new(service: Arc<dyn AgentService>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            service,
            image_path: image_path.into(),
            renderer: Arc::new(LogRenderer),
        }
    }

    /// Set the renderer receiving saved images
    pub fn with_renderer(mut self, renderer: Arc<dyn ImageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Dispatch every content part of `messages`, in order
    ///
    /// Each image overwrites the previous file at the image path.
    pub async fn dispatch(&self, messages: &[Message]) -> Result<Vec<DispatchedContent>> {
        let mut dispatched = Vec::new();

        for message in messages {
            debug!(
                message_id = %message.id,
                role = %message.role,
                parts = message.content.len(),
                "Dispatching message"
            );

            for part in &message.content {
                let item = match part {
                    MessageContent::Text(text) => DispatchedContent::Text {
                        role: message.role,
                        text: text.value.clone(),
                    },
                    MessageContent::ImageFile(image) => {
                        self.save_image(&image.file_id).await?;
                        DispatchedContent::Image {
                            role: message.role,
                            file_id: image.file_id.clone(),
                            path: self.image_path.clone(),
                        }
                    }
                    MessageContent::Other(_) => DispatchedContent::Other {
                        role: message.role,
                        repr: part.to_string(),
                    },
                };
                dispatched.push(item);
            }
        }

        Ok(dispatched)
    }

    async fn save_image(&self, file_id: &str) -> Result<()> {
        let bytes = self.service.file_content(file_id).await?;

        if let Some(parent) = self.image_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RunError::io(parent, e))?;
        }
        tokio::fs::write(&self.image_path, &bytes)
            .await
            .map_err(|e| RunError::io(&self.image_path, e))?;

        info!(
            file_id = %file_id,
            path = %self.image_path.display(),
            bytes = bytes.len(),
            "Saved image file"
        );
        self.renderer.render(&self.image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedService, image_message, message, text_message};
    use agent_service::TextContent;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Mutex<Vec<PathBuf>>,
    }

    impl ImageRenderer for RecordingRenderer {
        fn render(&self, path: &Path) -> Result<()> {
            self.rendered.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_text_in_order() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = ContentDispatcher::new(service, dir.path().join("chart.png"));

        let messages = vec![
            text_message("msg_1", Role::User, "What is the latest closing price for Microsoft?"),
            text_message("msg_2", Role::Agent, "412.345"),
        ];
        let dispatched = dispatcher.dispatch(&messages).await.unwrap();

        assert_eq!(
            dispatched,
            vec![
                DispatchedContent::Text {
                    role: Role::User,
                    text: "What is the latest closing price for Microsoft?".to_string(),
                },
                DispatchedContent::Text {
                    role: Role::Agent,
                    text: "412.345".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_image_is_saved_and_rendered() {
        let service = Arc::new(ScriptedService::new(vec![]).with_file("file_chart", b"\x89PNG-new"));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("portfolio_chart.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"old chart with more bytes").unwrap();

        let renderer = Arc::new(RecordingRenderer::default());
        let dispatcher =
            ContentDispatcher::new(service, &path).with_renderer(renderer.clone());

        let messages = vec![
            text_message("msg_1", Role::User, "Show a pie chart of my investments"),
            image_message("msg_2", "file_chart"),
        ];
        let dispatched = dispatcher.dispatch(&messages).await.unwrap();

        assert_eq!(
            dispatched[1],
            DispatchedContent::Image {
                role: Role::Agent,
                file_id: "file_chart".to_string(),
                path: path.clone(),
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG-new");
        assert_eq!(*renderer.rendered.lock().unwrap(), vec![path]);
    }

    #[tokio::test]
    async fn test_missing_parent_directory_is_created() {
        let service = Arc::new(ScriptedService::new(vec![]).with_file("file_chart", b"png"));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("chart.png");
        let dispatcher = ContentDispatcher::new(service, &path);

        dispatcher
            .dispatch(&[image_message("msg_1", "file_chart")])
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_unknown_part_uses_string_form() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = ContentDispatcher::new(service, dir.path().join("chart.png"));

        let other = MessageContent::Other(json!({ "type": "audio", "audio": { "id": "a1" } }));
        let text = MessageContent::Text(TextContent {
            value: "see above".to_string(),
            annotations: Vec::new(),
        });
        let dispatched = dispatcher
            .dispatch(&[message("msg_1", Role::Agent, vec![other, text])])
            .await
            .unwrap();

        assert_eq!(dispatched.len(), 2);
        let DispatchedContent::Other { repr, .. } = &dispatched[0] else {
            panic!("expected fallback content");
        };
        assert!(repr.contains("audio"));
        assert!(matches!(dispatched[1], DispatchedContent::Text { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_service_error() {
        let service = Arc::new(ScriptedService::new(vec![]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let dispatcher = ContentDispatcher::new(service, &path);

        let err = dispatcher
            .dispatch(&[image_message("msg_1", "file_missing")])
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Service(_)));
        assert!(!path.exists());
    }
}

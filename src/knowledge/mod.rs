pub mod binding;
pub mod static_source;
pub mod traits;

pub use binding::KnowledgeBinding;
pub use static_source::{Snippet, StaticKnowledgeSource};
pub use traits::{KnowledgeCard, KnowledgeSource};

use crate::config::Config;
use std::sync::Arc;

/// Build the knowledge binding described by `[knowledge]`.
///
/// An empty source path or `max_results = 0` yields [`KnowledgeBinding::Absent`].
pub async fn create_knowledge(config: &Config) -> anyhow::Result<KnowledgeBinding> {
    if !config.knowledge.is_enabled() {
        tracing::info!("knowledge injection disabled");
        return Ok(KnowledgeBinding::Absent);
    }

    let path = config.resolve_path(&config.knowledge.source);
    let source = StaticKnowledgeSource::load(&path, config.knowledge.max_results).await?;
    tracing::info!(
        path = %path.display(),
        snippets = source.len(),
        max_results = config.knowledge.max_results,
        "knowledge catalogue loaded"
    );
    Ok(KnowledgeBinding::present(Arc::new(source)))
}

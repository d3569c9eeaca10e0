use crate::commands::optional_llm;
use crate::config::AppConfig;
use crate::error::Result;
use crate::services::agents::RetrieverAgent;
use crate::services::breed_name::normalize_for_display;
use crate::services::retriever::WebRetriever;
use crate::services::tools::{PawRetrieverTool, ToolRegistry};
use std::sync::Arc;

pub async fn run(config: &AppConfig, breed: &str) -> Result<()> {
    let retriever = Arc::new(WebRetriever::new(&config.retriever)?);
    let registry = ToolRegistry::new().with_tool(Arc::new(PawRetrieverTool::new(retriever)));
    let agent = RetrieverAgent::from_registry(&registry, optional_llm(config)?)?;

    let breed = normalize_for_display(breed);
    let details = agent.describe(&breed).await?;
    println!("🦮 About the {}\n\n{}", breed, details);
    Ok(())
}

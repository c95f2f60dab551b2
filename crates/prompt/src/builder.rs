//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use nss_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system and user templates are rendered against the same
/// variables. Rendering is plain text: no HTML escaping is applied.
///
/// # Example
/// ```no_run
/// use nss_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is deterrence?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;
    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        definition.output.max_tokens,
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_prompt, ANSWER_PROMPT_ID, INTENT_PROMPT_ID};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{question}}", &vars(&[("question", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{context}}", &vars(&[("context", "a & <b>")]));
        assert_eq!(result.unwrap(), "a & <b>");
    }

    #[test]
    fn test_render_template_missing_variable() {
        // Handlebars renders missing variables as empty string
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert_eq!(result.unwrap(), "Question: ");
    }

    #[test]
    fn test_build_intent_prompt() {
        let def = builtin_prompt(INTENT_PROMPT_ID).unwrap();
        let built = build_prompt(
            &def,
            vars(&[
                ("countries", "Japan, Spain"),
                ("question", "What is the latest Japan NSS?"),
            ]),
        )
        .unwrap();

        let system = built.system.unwrap();
        assert!(system.contains("Available countries: Japan, Spain"));
        assert!(system.contains("\"wants_latest\": true/false"));
        assert_eq!(built.user, "What is the latest Japan NSS?");
        assert_eq!(built.metadata.max_tokens, Some(300));
    }

    #[test]
    fn test_build_answer_prompt() {
        let def = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        let built = build_prompt(
            &def,
            vars(&[
                ("question", "Compare cyber policy"),
                ("context", "[Source 1: Japan 2022, jp.pdf p.4]\ntext"),
            ]),
        )
        .unwrap();

        assert!(built.user.contains("**Question:** Compare cyber policy"));
        assert!(built.user.contains("[Source 1: Japan 2022, jp.pdf p.4]"));
        assert!(built.system.unwrap().starts_with("You are an expert analyst"));
        assert_eq!(built.metadata.source_prompt_id, ANSWER_PROMPT_ID);
    }
}

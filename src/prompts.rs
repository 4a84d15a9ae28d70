pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const CHAT_USER: &str = include_str!("../data/prompts/chat_user.txt");
pub const SIMULATED: &str = include_str!("../data/prompts/simulated.txt");

/// Returned when the provider answers without any completion content.
pub const EMPTY_COMPLETION_FALLBACK: &str = "Erro ao gerar prompt";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// The canned prompt produced in simulation mode.
pub fn simulated_prompt(briefing: &str) -> String {
    render(SIMULATED.trim_end(), &[("briefing", briefing)])
}

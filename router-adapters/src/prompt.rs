//! In-process prompt rendering for each `prompt_format_tag`

/// Render `system`/`user` into the wire text for the named format tag.
///
/// An unrecognized tag falls back to [`GenericTurn`] rather than
/// rejecting the call — the permissive behavior chosen for the open
/// question of unknown format tags.
#[must_use]
pub fn render_prompt(format_tag: &str, system: &str, user: &str) -> String {
    match format_tag {
        "ChatMLv1" => chat_ml_v1(system, user),
        "Llama3v1" => llama3_v1(system, user),
        "MistralInst" => mistral_inst(system, user),
        _ => generic_turn(system, user),
    }
}

fn chat_ml_v1(system: &str, user: &str) -> String {
    if system.is_empty() {
        format!("<|im_start|>user\n{user}<|im_end|>\n<|im_start|>assistant\n")
    } else {
        format!(
            "<|im_start|>system\n{system}<|im_end|>\n<|im_start|>user\n{user}<|im_end|>\n<|im_start|>assistant\n"
        )
    }
}

fn llama3_v1(system: &str, user: &str) -> String {
    if system.is_empty() {
        format!(
            "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n\n{user}<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n\n"
        )
    } else {
        format!(
            "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{system}<|eot_id|><|start_header_id|>user<|end_header_id|>\n\n{user}<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n\n"
        )
    }
}

fn mistral_inst(system: &str, user: &str) -> String {
    if system.is_empty() {
        format!("<s>[INST] {user} [/INST]")
    } else {
        format!("<s>[INST] {system}\n\n{user} [/INST]")
    }
}

fn generic_turn(system: &str, user: &str) -> String {
    if system.is_empty() {
        format!("User: {user}\nAssistant:")
    } else {
        format!("{system}\n\nUser: {user}\nAssistant:")
    }
}

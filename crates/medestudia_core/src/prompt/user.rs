//! User prompt templates.

use crate::{CompletionRequest, Language, Mode, Tool};

pub(crate) fn build_user_prompt(request: &CompletionRequest) -> String {
    let es = *request.language() == Language::Es;
    let input = request.input().as_str();
    let topic = request.topic();
    let subject = request.subject_label();

    // Inline "Contexto: X." sentence used by the structured templates.
    let context = match subject {
        Some(s) if es => format!("Contexto: {}.", s),
        Some(s) => format!("Context: {}.", s),
        None => String::new(),
    };

    match request.tool() {
        Tool::Chat => {
            let mut prompt = if es {
                format!("Usuario pregunta sobre: \"{}\"", input)
            } else {
                format!("User asks about: \"{}\"", input)
            };
            if let Some(s) = subject {
                prompt.push_str(if es { "\nContexto: " } else { "\nContext: " });
                prompt.push_str(s);
            }
            if *request.mode() == Mode::ClinicalGuidelines {
                prompt.push_str(if es {
                    "\n\nProporciona una respuesta estructurada basada en guías clínicas representativas, organizada en pasos claros con advertencias relevantes. Al final, incluye la nota sobre contenido representativo y futura integración de guías oficiales cubanas."
                } else {
                    "\n\nProvide a structured response based on representative clinical guidelines, organized in clear steps with relevant warnings. At the end, include the note about representative content and future integration of official Cuban guidelines."
                });
            }
            prompt
        }
        Tool::Mcq => {
            let difficulty = request.difficulty();
            if es {
                format!(
                    "Genera una pregunta de opción múltiple de dificultad {difficulty} sobre \"{topic}\". {context}\n\
Las opciones deben ser respuestas médicas reales y específicas, NO placeholders. La pregunta debe mencionar explícitamente \"{topic}\"."
                )
            } else {
                format!(
                    "Generate a {difficulty} difficulty multiple choice question about \"{topic}\". {context}\n\
Options must be real and specific medical answers, NOT placeholders. The question must explicitly mention \"{topic}\"."
                )
            }
        }
        Tool::Quiz => {
            if es {
                format!(
                    "Genera exactamente 5 preguntas de opción múltiple médicas sobre \"{topic}\". {context}\n\
Las preguntas deben cubrir diferentes aspectos del tema y mencionar explícitamente \"{topic}\" o conceptos relacionados. Las opciones deben ser respuestas médicas reales."
                )
            } else {
                format!(
                    "Generate exactly 5 medical multiple choice questions about \"{topic}\". {context}\n\
Questions should cover different aspects of the topic and explicitly mention \"{topic}\" or related concepts. Options must be real medical answers."
                )
            }
        }
        Tool::Explain => {
            if es {
                format!(
                    "Explica en detalle: \"{topic}\". {context}\n\
Asegúrate de mencionar explícitamente \"{topic}\" en la definición y en cada sección. Incluye consideraciones para recursos limitados relevantes para Cuba."
                )
            } else {
                format!(
                    "Explain in detail: \"{topic}\". {context}\n\
Make sure to explicitly mention \"{topic}\" in the definition and in each section. Include low-resource considerations relevant for Cuba."
                )
            }
        }
        Tool::Guides => {
            if es {
                format!(
                    "Consulta sobre guía clínica para: \"{input}\". {context}\n\
Proporciona una guía estructurada paso a paso. Menciona explícitamente \"{input}\" en los pasos. Incluye advertencias relevantes y la nota sobre contenido representativo."
                )
            } else {
                format!(
                    "Consultation about clinical guideline for: \"{input}\". {context}\n\
Provide a structured step-by-step guideline. Explicitly mention \"{input}\" in the steps. Include relevant warnings and the note about representative content."
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, MAX_INPUT_CHARS, RequestContext};

    fn request(tool: Tool, mode: Mode, language: Language, ctx: Option<RequestContext>) -> CompletionRequest {
        CompletionRequest::new(tool, mode, language, "neumonía", ctx, MAX_INPUT_CHARS)
    }

    #[test]
    fn test_chat_includes_subject_and_guideline_instruction() {
        let ctx = RequestContext::builder().subject("Neumología").build().unwrap();
        let prompt = build_user_prompt(&request(
            Tool::Chat,
            Mode::ClinicalGuidelines,
            Language::Es,
            Some(ctx),
        ));
        assert!(prompt.starts_with("Usuario pregunta sobre: \"neumonía\""));
        assert!(prompt.contains("\nContexto: Neumología"));
        assert!(prompt.contains("guías oficiales cubanas"));
    }

    #[test]
    fn test_plain_chat_has_no_guideline_instruction() {
        let prompt = build_user_prompt(&request(Tool::Chat, Mode::Preclinical, Language::En, None));
        assert_eq!(prompt, "User asks about: \"neumonía\"");
    }

    #[test]
    fn test_mcq_interpolates_difficulty_and_topic() {
        let ctx = RequestContext::builder()
            .topic("Neumonía adquirida en la comunidad")
            .difficulty(Difficulty::Hard)
            .build()
            .unwrap();
        let prompt = build_user_prompt(&request(Tool::Mcq, Mode::ClinicalStudy, Language::Es, Some(ctx)));
        assert!(prompt.contains("dificultad hard"));
        assert!(prompt.contains("\"Neumonía adquirida en la comunidad\""));
        assert!(prompt.contains("NO placeholders"));
        assert!(!prompt.contains("Contexto:"));
    }

    #[test]
    fn test_guides_quote_raw_input_not_topic() {
        let ctx = RequestContext::builder().topic("otro tema").build().unwrap();
        let prompt = build_user_prompt(&request(
            Tool::Guides,
            Mode::ClinicalGuidelines,
            Language::En,
            Some(ctx),
        ));
        assert!(prompt.contains("\"neumonía\""));
        assert!(!prompt.contains("otro tema"));
    }
}

//! Instruction template sent to the language model.
//!
//! Only the first [`MAX_PROMPT_COMMENTS`] comments are rendered. The rest are
//! silently left out of the listing, but the total count in the template is
//! always the full, untruncated count so the model can scale its estimates.

use replyscope_core::CanonicalComment;

/// Hard cap on comments rendered into one prompt.
pub const MAX_PROMPT_COMMENTS: usize = 80;

/// Language of generated text when none is configured.
pub const DEFAULT_LANGUAGE: &str = "español";

const SCHEMA: &str = r#"{
  "summary": "resumen ejecutivo del impacto del tweet en 2-3 oraciones",
  "totalComments": {total},
  "sentiment": {
    "positive": 0,
    "negative": 0,
    "neutral": 0
  },
  "emotions": [
    {"name": "nombre de la emoción", "percentage": 0, "description": "descripción breve"}
  ],
  "topics": [
    {"topic": "tema principal", "count": 0, "sentiment": "positive|negative|neutral"}
  ],
  "influentialUsers": [
    {"username": "usuario", "followers": 0, "comment": "su comentario", "sentiment": "positive|negative|neutral"}
  ],
  "timeline": [
    {"period": "descripción del período", "activity": "descripción de la actividad"}
  ],
  "impactScore": 0,
  "impactLabel": "Alto|Medio|Bajo",
  "keyInsights": ["insight 1", "insight 2", "insight 3"],
  "recommendation": "recomendación accionable basada en el análisis"
}"#;

/// Renders the analysis instructions for `comments`.
///
/// Pure and deterministic: the same input always yields the same string.
/// Line breaks inside a comment are flattened to spaces so every comment
/// occupies exactly one line.
#[must_use]
pub fn build_prompt(
    source_url: Option<&str>,
    comments: &[CanonicalComment],
    language: &str,
) -> String {
    let total = comments.len();
    let source_url = source_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or("no disponible");

    let listing = render_comments(comments);
    let schema = SCHEMA.replace("{total}", &total.to_string());

    format!(
        "Analizá los siguientes comentarios de un tweet y devolvé SOLO un JSON válido sin backticks ni texto adicional.

Tweet URL: {source_url}
Total de comentarios: {total}

Comentarios:
{listing}

Devolvé exactamente este JSON (sin texto extra, sin backticks):
{schema}

Reglas:
- sentiment: los 3 valores deben sumar exactamente 100 (son porcentajes)
- emotions: incluir entre 3 y 5 emociones predominantes, los percentages deben sumar 100
- topics: exactamente los 5 temas más mencionados con cantidad estimada de menciones
- influentialUsers: exactamente los 3 usuarios con más seguidores o más likes en su comentario
- timeline: descripción cualitativa de cómo evolucionó la conversación (si hay fechas disponibles)
- impactScore: número del 1 al 100 que refleja el impacto general
- keyInsights: exactamente 3 insights accionables
- todos los textos en {language}"
    )
}

fn render_comments(comments: &[CanonicalComment]) -> String {
    comments
        .iter()
        .take(MAX_PROMPT_COMMENTS)
        .enumerate()
        .map(|(i, comment)| {
            format!(
                "[{}] @{} ({} seguidores, {} likes): \"{}\"",
                i + 1,
                comment.author,
                comment.follower_count,
                comment.like_count,
                comment.text.replace(['\r', '\n'], " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Research requests and the glue around the generative model.
//!
//! The network round trip itself lives outside this crate. What is here is
//! everything on either side of it: the request the user fills in, the
//! prompt and sampling settings sent along, and the extraction of text and
//! grounding sources from the model's JSON response.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant,)*
        }

        impl $name {
            /// All values, in form order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// The label shown to the user and written into stored records.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.label().eq_ignore_ascii_case(s)
                            || format!("{v:?}").eq_ignore_ascii_case(s)
                    })
                    .ok_or_else(|| {
                        format!(concat!("unknown ", stringify!($name), ": {:?}"), s).into()
                    })
            }
        }
    };
}

labelled_enum! {
    /// The kind of material to produce.
    pub enum MaterialType {
        /// A summary.
        Summary => "Resumo",
        /// An exhaustive research paper.
        #[default]
        ResearchPaper => "Trabalho de Pesquisa",
        /// A study sheet.
        StudySheet => "Ficha de Estudo",
        /// A scientific article.
        ScientificArticle => "Artigo Científico",
    }
}

labelled_enum! {
    /// The citation norm the references follow.
    pub enum TechnicalNorm {
        /// Mozambican norm.
        #[default]
        Mozambique => "Moçambique",
        /// Brazilian ABNT.
        Brazil => "Brasil (ABNT)",
        /// Portuguese ISO 690.
        Portugal => "Portugal (ISO 690)",
        /// Angolan norm.
        Angola => "Angola",
    }
}

labelled_enum! {
    /// The education level the material targets.
    pub enum EducationLevel {
        /// Basic education.
        Basic => "Ensino Básico",
        /// Secondary education.
        Secondary => "Ensino Secundário",
        /// Higher education.
        #[default]
        Higher => "Ensino Superior",
    }
}

impl TechnicalNorm {
    /// Guesses the norm from an IANA time zone name such as
    /// `Africa/Maputo`.
    pub fn from_time_zone(tz: &str) -> Option<Self> {
        if tz.contains("Maputo") {
            Some(TechnicalNorm::Mozambique)
        } else if tz.contains("Sao_Paulo") || tz.contains("Brasilia") {
            Some(TechnicalNorm::Brazil)
        } else if tz.contains("Lisbon") {
            Some(TechnicalNorm::Portugal)
        } else if tz.contains("Luanda") {
            Some(TechnicalNorm::Angola)
        } else {
            None
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// The research topic.
    pub topic: String,
    /// The kind of material.
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    /// The citation norm.
    pub norm: TechnicalNorm,
    /// The education level.
    pub level: EducationLevel,
}

impl ResearchRequest {
    /// Creates a request for `topic` with the form defaults.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Rejects requests that cannot be submitted.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err("the research topic must not be empty".into());
        }
        Ok(())
    }

    /// The length the model is asked to reach.
    pub fn target_words(&self) -> u32 {
        match self.material_type {
            MaterialType::ResearchPaper => 5000,
            _ => 2000,
        }
    }
}

/// A web source the model grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundingSource {
    /// The page title.
    pub title: String,
    /// The page address.
    pub uri: String,
}

impl GroundingSource {
    /// Creates a source.
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// A generated result as kept in the user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    /// Random identifier, unique within one user's history.
    pub id: String,
    /// Editor markup.
    pub content: String,
    /// Sources consulted by the model.
    pub sources: Vec<GroundingSource>,
    /// The request that produced this result.
    pub request: ResearchRequest,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The owner.
    pub user_id: String,
}

/// Sampling parameters sent with every generation request.
///
/// They are pinned to keep long answers as reproducible as the service
/// allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    /// The model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Fixed sampling seed.
    pub seed: u32,
    /// Token budget for the model's reasoning.
    pub thinking_budget: u32,
    /// Whether web search grounding is enabled.
    pub google_search: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-3-pro-preview".into(),
            temperature: 0.0,
            top_p: 0.1,
            seed: 42,
            thinking_budget: 4000,
            google_search: true,
        }
    }
}

/// The prompt pair sent for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPrompt {
    /// Instructions describing role, length, structure and citation norm.
    pub system_instruction: String,
    /// The user turn.
    pub contents: String,
}

impl ResearchPrompt {
    /// Builds the prompt for `request`.
    pub fn new(request: &ResearchRequest) -> Self {
        let target_words = request.target_words();
        let ResearchRequest {
            topic,
            material_type,
            norm,
            level,
        } = request;

        let system_instruction = format!(
            "Atue como um Professor e Pesquisador Acadêmico de elite.
Seu objetivo é gerar um material didático de altíssima qualidade e máxima extensão possível.

DIRETRIZ DE EXTENSÃO:
- Se o tipo for \"{research}\", você deve ser EXTREMAMENTE exaustivo, visando uma profundidade de conteúdo equivalente a pelo menos {target_words} palavras.
- Desenvolva cada sub-tópico com riqueza de detalhes, exemplos práticos e fundamentação teórica robusta.

PROIBIÇÕES CRÍTICAS (NÃO INCLUA):
- NÃO mencione a quantidade de palavras ou o processo de geração (ex: \"Aqui estão as 5000 palavras...\").
- NÃO inclua introduções como \"Como Professor...\", \"A seguir apresento...\", ou qualquer comentário sobre o seu papel.
- NÃO inclua cabeçalhos genéricos de instituições ou faculdades.
- Comece DIRETAMENTE com o título do tema.

REQUISITOS DE CONTEÚDO:
1. Tópico: {topic}
2. Tipo: {material_type}
3. Nível: {level}
4. Norma Técnica: {norm}
5. Idioma: Português Padrão/Europeu.
6. Formate rigorosamente as citações (Sobrenome, Ano) e a lista de REFERÊNCIAS final conforme a norma {norm}.

ESTRUTURA OBRIGATÓRIA:
- Título Principal (H1)
- Introdução Detalhada (Contextualização profunda, Problematização, Objetivos)
- Revisão da Literatura (Vários sub-capítulos exaustivos H2 e H3)
- Metodologia e Discussão (Se aplicável)
- Conclusão Abrangente
- Referências Bibliográficas (Lista técnica completa)",
            research = MaterialType::ResearchPaper,
        );

        let contents = format!(
            "Gere um trabalho académico definitivo, exaustivo e de rigor científico máximo sobre \"{topic}\". \
Priorize a densidade de informação e a extensão do texto."
        );

        Self {
            system_instruction,
            contents,
        }
    }
}

/// Used when the model returns no text at all.
pub const EMPTY_RESPONSE_TEXT: &str = "Não foi possível gerar o conteúdo.";

/// Used when a grounding chunk carries no title.
pub const UNTITLED_SOURCE: &str = "Fonte da Pesquisa";

/// Concatenates the text parts of the first candidate of a
/// `generateContent` response.
pub fn response_text(response: &Value) -> String {
    let text = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        warn!("research: the response carries no text");
        EMPTY_RESPONSE_TEXT.to_owned()
    } else {
        text
    }
}

/// Extracts the web sources from the grounding metadata of the first
/// candidate. Chunks without a web address are skipped.
pub fn grounding_sources(response: &Value) -> Vec<GroundingSource> {
    let Some(chunks) = response
        .pointer("/candidates/0/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.get("web")?;
            let uri = web.get("uri").and_then(Value::as_str)?;
            let title = web
                .get("title")
                .and_then(Value::as_str)
                .filter(|title| !title.is_empty())
                .unwrap_or(UNTITLED_SOURCE);
            Some(GroundingSource::new(title, uri))
        })
        .collect()
}

/// Renders the model's line-oriented text as editor markup.
///
/// Lines starting with `# `, `## ` or `### ` become headings, every other
/// non-blank line becomes a paragraph.
pub fn render_markup(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (tag, body) = if let Some(rest) = line.strip_prefix("# ") {
            ("h1", rest)
        } else if let Some(rest) = line.strip_prefix("## ") {
            ("h2", rest)
        } else if let Some(rest) = line.strip_prefix("### ") {
            ("h3", rest)
        } else {
            ("p", line)
        };

        out.push('<');
        out.push_str(tag);
        out.push('>');
        out.push_str(html_escape::encode_text(body).as_ref());
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        assert_eq!(
            "Brasil (ABNT)".parse::<TechnicalNorm>().unwrap(),
            TechnicalNorm::Brazil
        );
        assert_eq!(
            "studysheet".parse::<MaterialType>().unwrap(),
            MaterialType::StudySheet
        );
        assert!("Doctorate".parse::<EducationLevel>().is_err());
    }

    #[test]
    fn form_defaults() {
        assert_eq!(MaterialType::default(), MaterialType::ResearchPaper);
        assert_eq!(TechnicalNorm::default(), TechnicalNorm::Mozambique);
        assert_eq!(EducationLevel::default(), EducationLevel::Higher);
    }

    #[test]
    fn request_serializes_with_labels() {
        let request = ResearchRequest::new("Água");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "topic": "Água",
                "type": "Trabalho de Pesquisa",
                "norm": "Moçambique",
                "level": "Ensino Superior",
            })
        );
    }

    #[test]
    fn target_length_depends_on_type() {
        let mut request = ResearchRequest::new("x");
        assert_eq!(request.target_words(), 5000);
        request.material_type = MaterialType::Summary;
        assert_eq!(request.target_words(), 2000);
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert!(ResearchRequest::new("  ").validate().is_err());
        assert!(ResearchRequest::new("Clima").validate().is_ok());
    }

    #[test]
    fn norm_from_time_zone() {
        let cases = [
            ("Africa/Maputo", Some(TechnicalNorm::Mozambique)),
            ("America/Sao_Paulo", Some(TechnicalNorm::Brazil)),
            ("Europe/Lisbon", Some(TechnicalNorm::Portugal)),
            ("Africa/Luanda", Some(TechnicalNorm::Angola)),
            ("Europe/Berlin", None),
        ];
        for (tz, norm) in cases {
            assert_eq!(TechnicalNorm::from_time_zone(tz), norm, "{tz}");
        }
    }

    #[test]
    fn prompt_mentions_request_fields() {
        let request = ResearchRequest {
            topic: "Energia Solar".into(),
            material_type: MaterialType::Summary,
            norm: TechnicalNorm::Portugal,
            level: EducationLevel::Secondary,
        };
        let prompt = ResearchPrompt::new(&request);
        assert!(prompt.system_instruction.contains("Tópico: Energia Solar"));
        assert!(prompt.system_instruction.contains("Portugal (ISO 690)"));
        assert!(prompt.system_instruction.contains("pelo menos 2000 palavras"));
        assert!(prompt.contents.contains("\"Energia Solar\""));
    }

    #[test]
    fn extracts_text_and_sources() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "# T\n" }, { "text": "body" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example", "title": "A" } },
                        { "retrievedContext": { "uri": "ignored" } },
                        { "web": { "uri": "https://b.example" } },
                        { "web": { "title": "no address" } },
                    ]
                }
            }]
        });

        assert_eq!(response_text(&response), "# T\nbody");
        assert_eq!(
            grounding_sources(&response),
            vec![
                GroundingSource::new("A", "https://a.example"),
                GroundingSource::new(UNTITLED_SOURCE, "https://b.example"),
            ]
        );
    }

    #[test]
    fn empty_response_falls_back() {
        let response = json!({ "candidates": [] });
        assert_eq!(response_text(&response), EMPTY_RESPONSE_TEXT);
        assert!(grounding_sources(&response).is_empty());
    }

    #[test]
    fn renders_markup_from_lines() {
        let text = "# Title\n\n## Part\n### Sub\nA & B < C\n   \n#hashtag";
        assert_eq!(
            render_markup(text),
            "<h1>Title</h1><h2>Part</h2><h3>Sub</h3><p>A &amp; B &lt; C</p><p>#hashtag</p>"
        );
    }
}

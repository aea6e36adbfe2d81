//! Rendering of templated bundle assets against the runtime configuration.
//!
//! Templated assets use `[{[ ... ]}]` markers so they do not collide with the
//! front-end's own `{{ }}` syntax. Markers are translated to Tera source once
//! at startup; everything else is passed through inside `{% raw %}` blocks.
use tera::{Context, Tera};
use thiserror::Error;

use crate::dto::RuntimeConfig;
use crate::services::bundle::AssetBundle;

pub const OPEN_DELIM: &str = "[{[";
pub const CLOSE_DELIM: &str = "]}]";

/// Entry point rendered by the index route.
pub const INDEX_TEMPLATE: &str = "index.html";

const STATEMENT_KEYWORDS: &[&str] = &["if", "elif", "else", "endif", "for", "endfor", "set"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("bundle has no {INDEX_TEMPLATE}")]
    MissingIndex,
    #[error("template {name} could not be read")]
    Read {
        name: String,
        #[source]
        source: crate::services::bundle::AssetError,
    },
    #[error("template {0} is not valid UTF-8")]
    Encoding(String),
    #[error("template {name}: unclosed marker at byte {offset}")]
    Unclosed { name: String, offset: usize },
    #[error("template {name}: empty marker at byte {offset}")]
    EmptyMarker { name: String, offset: usize },
    #[error("template {0}: literal text contains a raw block terminator")]
    ReservedSequence(String),
    #[error("template {name} failed to parse")]
    Parse {
        name: String,
        #[source]
        source: tera::Error,
    },
    #[error("template {0} is not registered")]
    Unknown(String),
    #[error("template {name} failed to render")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

/// Set of compiled templated assets.
pub struct TemplateInjector {
    tera: Tera,
}

impl TemplateInjector {
    /// Compile `index.html` and every `.js` file of the bundle.
    ///
    /// Any failure here is a packaging fault and must stop startup.
    pub fn compile(bundle: &dyn AssetBundle) -> Result<Self, TemplateError> {
        let mut injector = Self::empty();
        let mut has_index = false;

        for path in bundle.paths() {
            let is_index = path.as_str() == INDEX_TEMPLATE;
            if !is_index && !path.is_script() {
                continue;
            }
            has_index |= is_index;

            let bytes = bundle.open(&path).map_err(|source| TemplateError::Read {
                name: path.to_string(),
                source,
            })?;
            let text = String::from_utf8(bytes)
                .map_err(|_| TemplateError::Encoding(path.to_string()))?;
            injector.add(path.as_str(), &text)?;
        }

        if !has_index {
            return Err(TemplateError::MissingIndex);
        }

        log::info!(
            "Compiled {} templated assets",
            injector.tera.get_template_names().count()
        );
        Ok(injector)
    }

    fn empty() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        Self { tera }
    }

    fn add(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        let translated = translate(name, source)?;
        self.tera
            .add_raw_template(name, &translated)
            .map_err(|source| TemplateError::Parse {
                name: name.to_string(),
                source,
            })
    }

    pub fn render(&self, name: &str, config: &RuntimeConfig) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(TemplateError::Unknown(name.to_string()));
        }

        let mut context =
            Context::from_serialize(&config.data).map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })?;
        context.insert("json", &config.serialized_json);

        self.tera
            .render(name, &context)
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })
    }
}

/// Rewrite `[{[ ... ]}]` markers into Tera tags, shielding all other text.
fn translate(name: &str, source: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len() + 64);
    let mut rest = source;
    let mut consumed = 0;

    while let Some(start) = rest.find(OPEN_DELIM) {
        push_literal(name, &mut out, &rest[..start])?;

        let after = &rest[start + OPEN_DELIM.len()..];
        let Some(end) = after.find(CLOSE_DELIM) else {
            return Err(TemplateError::Unclosed {
                name: name.to_string(),
                offset: consumed + start,
            });
        };

        let inner = after[..end].trim();
        if inner.is_empty() {
            return Err(TemplateError::EmptyMarker {
                name: name.to_string(),
                offset: consumed + start,
            });
        }

        let keyword = inner.split_whitespace().next().unwrap_or_default();
        if STATEMENT_KEYWORDS.contains(&keyword) {
            out.push_str("{% ");
            out.push_str(inner);
            out.push_str(" %}");
        } else {
            out.push_str("{{ ");
            out.push_str(inner);
            out.push_str(" }}");
        }

        let advance = start + OPEN_DELIM.len() + end + CLOSE_DELIM.len();
        consumed += advance;
        rest = &rest[advance..];
    }

    push_literal(name, &mut out, rest)?;
    Ok(out)
}

fn push_literal(name: &str, out: &mut String, literal: &str) -> Result<(), TemplateError> {
    let needs_raw = literal.contains("{{")
        || literal.contains("{%")
        || literal.contains("{#")
        || literal.ends_with('{');

    if !needs_raw {
        out.push_str(literal);
        return Ok(());
    }
    if literal.contains("endraw") {
        return Err(TemplateError::ReservedSequence(name.to_string()));
    }

    out.push_str("{% raw %}");
    out.push_str(literal);
    out.push_str("{% endraw %}");
    Ok(())
}

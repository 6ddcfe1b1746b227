use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Coarse (universal) part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    /// Adjective.
    Adj,
    /// Adposition (preposition or postposition).
    Adp,
    /// Adverb.
    Adv,
    /// Auxiliary verb.
    Aux,
    /// Coordinating conjunction.
    Cconj,
    /// Determiner.
    Det,
    /// Interjection.
    Intj,
    /// Noun.
    Noun,
    /// Numeral.
    Num,
    /// Particle.
    Part,
    /// Pronoun.
    Pron,
    /// Proper noun.
    Propn,
    /// Punctuation.
    Punct,
    /// Subordinating conjunction.
    Sconj,
    /// Symbol.
    Sym,
    /// Verb.
    Verb,
    /// Whitespace token.
    Space,
    /// Anything else.
    X,
}

impl PartOfSpeech {
    /// Universal tag name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::Space => "SPACE",
            Self::X => "X",
        }
    }

    /// Verbs and adpositions are structure, never content, when they head a subtree.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Verb | Self::Adp)
    }
}

impl From<&str> for PartOfSpeech {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" | "CONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            "SPACE" => Self::Space,
            _ => Self::X,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label carried by the sentence root.
pub const ROOT_LABEL: &str = "ROOT";

/// Fine-grained tag of wh-determiners ("which", "what" as determiner).
pub const WH_DETERMINER_TAG: &str = "WDT";

/// Token as reported by a parser, before the tree is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    /// Surface text.
    pub text: String,
    /// Coarse part of speech.
    pub pos: PartOfSpeech,
    /// Fine-grained tag.
    pub tag: String,
    /// Dependency label relative to the head.
    pub dep: String,
    /// Sentence-local index of the head; the root points at itself.
    pub head: usize,
}

impl RawToken {
    /// Creates a raw token.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        pos: PartOfSpeech,
        tag: impl Into<String>,
        dep: impl Into<String>,
        head: usize,
    ) -> Self {
        Self {
            text: text.into(),
            pos,
            tag: tag.into(),
            dep: dep.into(),
            head,
        }
    }
}

/// Node of a dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Position in the whole document.
    pub index: usize,
    /// Surface text.
    pub text: String,
    /// Coarse part of speech.
    pub pos: PartOfSpeech,
    /// Fine-grained tag.
    pub tag: String,
    /// Dependency label relative to the head.
    pub dep: String,
    /// Sentence-local indices of the children, in surface order.
    pub children: Vec<usize>,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One parsed sentence stored as an arena of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    tokens: Vec<Token>,
    root: usize,
}

impl Sentence {
    /// Assembles a tree from head indices. `offset` is the document index of
    /// the first token.
    ///
    /// Fails unless there is exactly one root and every token reaches it.
    pub fn from_heads(raw: Vec<RawToken>, offset: usize) -> Result<Self, NlpError> {
        let len = raw.len();
        if len == 0 {
            return Err(NlpError::malformed("sentence has no tokens"));
        }
        let mut root = None;
        for (idx, token) in raw.iter().enumerate() {
            if token.head >= len {
                return Err(NlpError::malformed(format!(
                    "token {} '{}' has head {} outside the sentence",
                    offset + idx,
                    token.text,
                    offset + token.head
                )));
            }
            if token.head == idx {
                if let Some(previous) = root {
                    return Err(NlpError::malformed(format!(
                        "sentence has two roots ({} and {})",
                        offset + previous,
                        offset + idx
                    )));
                }
                root = Some(idx);
            }
        }
        let root = root.ok_or_else(|| NlpError::malformed("sentence has no root"))?;

        // every head chain must end at the root within `len` steps
        for start in 0..len {
            let mut current = start;
            let mut steps = 0;
            while current != root {
                current = raw[current].head;
                steps += 1;
                if steps > len {
                    return Err(NlpError::malformed(format!(
                        "token {} is part of a head cycle",
                        offset + start
                    )));
                }
            }
        }

        let mut children = vec![Vec::new(); len];
        for (idx, token) in raw.iter().enumerate() {
            if idx != root {
                children[token.head].push(idx);
            }
        }
        let tokens = raw
            .into_iter()
            .zip(children)
            .enumerate()
            .map(|(idx, (token, children))| Token {
                index: offset + idx,
                text: token.text,
                pos: token.pos,
                tag: token.tag,
                dep: token.dep,
                children,
            })
            .collect();
        Ok(Self { tokens, root })
    }

    /// Sentence-local index of the root.
    #[must_use]
    pub const fn root(&self) -> usize {
        self.root
    }

    /// Root token.
    #[must_use]
    pub fn root_token(&self) -> &Token {
        &self.tokens[self.root]
    }

    /// Token at a sentence-local index.
    #[must_use]
    pub fn token(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    /// Tokens in surface order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Children of `idx` in surface order.
    pub fn children(&self, idx: usize) -> impl Iterator<Item = (usize, &Token)> + '_ {
        self.tokens[idx]
            .children
            .iter()
            .map(move |&child| (child, &self.tokens[child]))
    }

    /// Surface text of the sentence, tokens joined by single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Indented dump of the tree, one token per line:
    /// `text [dep/POS/tag]`.
    #[must_use]
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    fn render_node(&self, idx: usize, depth: usize, out: &mut String) {
        let token = &self.tokens[idx];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!(
            "{} [{}/{}/{}]\n",
            token.text, token.dep, token.pos, token.tag
        ));
        for &child in &token.children {
            self.render_node(child, depth + 1, out);
        }
    }
}

/// Parser output for a whole question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// Text the parser was given.
    pub text: String,
    /// Sentences in document order.
    pub sentences: Vec<Sentence>,
}

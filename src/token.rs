use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub form: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub form: String,
    pub tag: String,
    pub lemma: String,
}

impl Record {
    pub fn new(form: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            tag: tag.into(),
        }
    }

    pub fn with_lemma(self, lemma: String) -> ResolvedRecord {
        ResolvedRecord {
            form: self.form,
            tag: self.tag,
            lemma,
        }
    }
}

impl ResolvedRecord {
    pub fn to_line(&self, separator: &str) -> String {
        let mut line =
            String::with_capacity(self.form.len() + self.tag.len() + self.lemma.len() + 2 * separator.len());
        line.push_str(&self.form);
        line.push_str(separator);
        line.push_str(&self.tag);
        line.push_str(separator);
        line.push_str(&self.lemma);
        line
    }
}

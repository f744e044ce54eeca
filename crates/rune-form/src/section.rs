use crate::field::{Field, FieldId};

/// Ordered group of field references with header/footer text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    header: String,
    footer: String,
    fields: Vec<FieldId>,
    hidden: bool,
}

impl Section {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldId>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Field ids in display order, separator sentinels included.
    pub fn field_ids(&self) -> &[FieldId] {
        &self.fields
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// One rendered row of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    Field(&'a Field),
    Separator,
}

impl<'a> Row<'a> {
    pub fn field(&self) -> Option<&'a Field> {
        match self {
            Row::Field(field) => Some(field),
            Row::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Row::Separator)
    }
}

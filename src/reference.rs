//! Reference tags that link a sale to documents kept elsewhere, e.g. `Quotation#123, Invoice#45`.

/// A kind of external document a sale can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A formal quotation sent to the customer.
    Quotation,
    /// A formal invoice sent to the customer.
    Invoice,
    /// The QuickBooks document number.
    QuickBooks,
    /// The QuickBooks estimate number.
    QuickBooksEstimate,
}

impl ReferenceKind {
    /// All kinds in the order they are encoded.
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Quotation,
        ReferenceKind::Invoice,
        ReferenceKind::QuickBooks,
        ReferenceKind::QuickBooksEstimate,
    ];

    /// The text written before the document number.
    pub fn prefix(self) -> &'static str {
        match self {
            ReferenceKind::Quotation => "Quotation#",
            ReferenceKind::Invoice => "Invoice#",
            ReferenceKind::QuickBooks => "QB#",
            ReferenceKind::QuickBooksEstimate => "QB Est#",
        }
    }

    /// The label shown next to the checkbox in the sale form.
    pub fn label(self) -> &'static str {
        match self {
            ReferenceKind::Quotation => "Formal Quotation #",
            ReferenceKind::Invoice => "Formal Invoice #",
            ReferenceKind::QuickBooks => "QB #",
            ReferenceKind::QuickBooksEstimate => "QB Est #",
        }
    }

    /// The prefix for the form field names of this kind.
    pub fn field_name(self) -> &'static str {
        match self {
            ReferenceKind::Quotation => "quotation",
            ReferenceKind::Invoice => "invoice",
            ReferenceKind::QuickBooks => "qb",
            ReferenceKind::QuickBooksEstimate => "qb_estimate",
        }
    }

    fn index(self) -> usize {
        match self {
            ReferenceKind::Quotation => 0,
            ReferenceKind::Invoice => 1,
            ReferenceKind::QuickBooks => 2,
            ReferenceKind::QuickBooksEstimate => 3,
        }
    }
}

/// The set of reference tags on a sale.
///
/// A tag that is present but has no number is kept, which happens when the
/// box is ticked before the number is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTags {
    numbers: [Option<String>; 4],
}

impl ReferenceTags {
    /// Set the tag for `kind`. `None` removes it.
    pub fn set(&mut self, kind: ReferenceKind, number: Option<String>) {
        self.numbers[kind.index()] = number;
    }

    /// Builder style [ReferenceTags::set].
    #[cfg(test)]
    pub fn with(mut self, kind: ReferenceKind, number: &str) -> Self {
        self.set(kind, Some(number.to_owned()));
        self
    }

    /// The number for `kind`, or `None` if the tag is absent.
    pub fn get(&self, kind: ReferenceKind) -> Option<&str> {
        self.numbers[kind.index()].as_deref()
    }

    /// Join the present tags, e.g. `Quotation#123, QB#7`.
    pub fn encode(&self) -> String {
        ReferenceKind::ALL
            .iter()
            .filter_map(|kind| {
                self.get(*kind)
                    .map(|number| format!("{}{number}", kind.prefix()))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Read tags back from a reference string.
    ///
    /// Matching ignores case. A tag's number is the run of digits right
    /// after its prefix.
    pub fn parse(reference: &str) -> Self {
        let lowercase = reference.to_lowercase();
        let mut tags = Self::default();

        for kind in ReferenceKind::ALL {
            let prefix = kind.prefix().to_lowercase();

            if let Some(start) = lowercase.find(&prefix) {
                let after = &lowercase[start + prefix.len()..];
                let number = after
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>();
                tags.set(kind, Some(number));
            }
        }

        tags
    }
}

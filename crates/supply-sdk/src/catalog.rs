use serde::{Deserialize, Serialize};

/// Kinds of document a sale agreement can require.
///
/// The numeric codes are part of the on-chain encoding and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DocumentType {
    Invoice = 1,
    CertificateOfAnalysis = 2,
    CertificateOfOrigin = 3,
    BillOfLading = 4,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::CertificateOfAnalysis,
        DocumentType::CertificateOfOrigin,
        DocumentType::BillOfLading,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(DocumentType::Invoice),
            2 => Some(DocumentType::CertificateOfAnalysis),
            3 => Some(DocumentType::CertificateOfOrigin),
            4 => Some(DocumentType::BillOfLading),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::CertificateOfAnalysis => "Certificate of Analysis",
            DocumentType::CertificateOfOrigin => "Certificate of Origin",
            DocumentType::BillOfLading => "Bill of Lading",
        }
    }
}

impl TryFrom<u8> for DocumentType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DocumentType::from_code(i64::from(code)).ok_or_else(|| format!("unknown document type: {code}"))
    }
}

impl From<DocumentType> for u8 {
    fn from(doc: DocumentType) -> Self {
        doc.code()
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog row sent to the document selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTypeEntry {
    pub code: u8,
    pub label: &'static str,
}

pub fn catalog() -> Vec<DocumentTypeEntry> {
    DocumentType::ALL
        .iter()
        .map(|d| DocumentTypeEntry {
            code: d.code(),
            label: d.label(),
        })
        .collect()
}

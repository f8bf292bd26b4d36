//! Per-operation field layouts.
//!
//! Each operation has a fixed document shape: a root element named after
//! the operation, followed by groups and leaves in an exact order. The
//! tables here enumerate that shape as data — every entry is an explicit
//! (element tag, source parameter key) pair — so each operation's wire
//! format can be reviewed and tested on its own.

/// One of the five webservice request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Start a Buy Page Cielo transaction (`requisicao-transacao`).
    Create,
    /// Request a correlation id for a Buy Page Loja flow
    /// (`requisicao-tid`).
    RequestTid,
    /// Authorize directly with full card data (`requisicao-autorizacao-portador`).
    DirectAuth,
    /// Query the state of an existing transaction (`requisicao-consulta`).
    Inquiry,
    /// Capture a previously authorized transaction (`requisicao-captura`).
    Capture,
}

/// A slot in an operation's document, in emission order.
pub(crate) enum Segment {
    /// The `dados-ec` merchant credentials group, filled from the
    /// configuration rather than the parameter set.
    Credentials,
    /// A named group of leaf elements: `(group tag, [(element tag,
    /// source parameter key)])`.
    Group(&'static str, &'static [(&'static str, &'static str)]),
    /// A single leaf element: `(element tag, source parameter key)`.
    Leaf(&'static str, &'static str),
}

const ORDER_DATA: &[(&str, &str)] = &[
    ("numero", "numero"),
    ("valor", "valor"),
    ("moeda", "moeda"),
    ("data-hora", "data-hora"),
    ("idioma", "idioma"),
];

const PAYMENT_METHOD: &[(&str, &str)] = &[
    ("bandeira", "bandeira"),
    ("produto", "produto"),
    ("parcelas", "parcelas"),
];

const CARD_DATA: &[(&str, &str)] = &[
    ("numero", "cartao-numero"),
    ("validade", "cartao-validade"),
    ("indicador", "cartao-indicador"),
    ("codigo-seguranca", "cartao-codigo-seguranca"),
    ("nome-portador", "cartao-nome-portador"),
];

const CREATE: &[Segment] = &[
    Segment::Credentials,
    Segment::Group("dados-pedido", ORDER_DATA),
    Segment::Group("forma-pagamento", PAYMENT_METHOD),
    Segment::Leaf("url-retorno", "url-retorno"),
    Segment::Leaf("autorizar", "autorizar"),
    Segment::Leaf("capturar", "capturar"),
];

const REQUEST_TID: &[Segment] = &[
    Segment::Credentials,
    Segment::Group("forma-pagamento", PAYMENT_METHOD),
];

const DIRECT_AUTH: &[Segment] = &[
    Segment::Leaf("tid", "tid"),
    Segment::Credentials,
    Segment::Group("dados-cartao", CARD_DATA),
    Segment::Group("dados-pedido", ORDER_DATA),
    Segment::Group("forma-pagamento", PAYMENT_METHOD),
    Segment::Leaf("capturar-automaticamente", "capturar"),
];

const INQUIRY: &[Segment] = &[Segment::Credentials, Segment::Leaf("tid", "tid")];

const CAPTURE: &[Segment] = &[Segment::Leaf("tid", "tid"), Segment::Credentials];

impl Operation {
    /// The root element name of this operation's request document.
    #[must_use]
    pub fn root_tag(self) -> &'static str {
        match self {
            Self::Create => "requisicao-transacao",
            Self::RequestTid => "requisicao-tid",
            Self::DirectAuth => "requisicao-autorizacao-portador",
            Self::Inquiry => "requisicao-consulta",
            Self::Capture => "requisicao-captura",
        }
    }

    /// The ordered segments of this operation's request document.
    pub(crate) fn layout(self) -> &'static [Segment] {
        match self {
            Self::Create => CREATE,
            Self::RequestTid => REQUEST_TID,
            Self::DirectAuth => DIRECT_AUTH,
            Self::Inquiry => INQUIRY,
            Self::Capture => CAPTURE,
        }
    }
}

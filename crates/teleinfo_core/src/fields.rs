//! Catálogo de etiquetas e despacho de linhas validadas para o [`ValueStore`].
//!
//! Cada etiqueta conhecida tem um descritor estático: onde começa o dado,
//! quantos bytes ler e como converter. O catálogo é percorrido da etiqueta
//! mais longa para a mais curta, de modo que `SINSTS1` nunca seja
//! confundida com `SINSTS`.

use crate::protocol::SEPARATOR;
use crate::store::ValueStore;
use tracing::{debug, trace};

/// Largura do dado dentro da linha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Exatamente `n` bytes (truncado se a linha for mais curta)
    Fixed(usize),
    /// Até o fim da linha
    ToEnd,
}

/// Tipo de destino do dado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Texto; tabulações viram espaços
    Text,
    /// Inteiro decimal, armazenado na forma canônica
    Integer,
}

/// Descritor estático de uma etiqueta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    /// Início do dado relativo ao início da etiqueta
    pub offset: usize,
    pub width: Width,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    const fn text(label: &'static str, width: usize) -> Self {
        Self {
            label,
            offset: label.len() + 1,
            width: Width::Fixed(width),
            kind: FieldKind::Text,
        }
    }

    const fn integer(label: &'static str) -> Self {
        Self {
            label,
            offset: label.len() + 1,
            width: Width::ToEnd,
            kind: FieldKind::Integer,
        }
    }

    /// `true` se a linha começa com esta etiqueta seguida de um separador.
    pub fn matches(&self, body: &[u8]) -> bool {
        let label = self.label.as_bytes();
        body.starts_with(label)
            && body
                .get(label.len())
                .is_some_and(|&b| b == SEPARATOR || b == b' ')
    }
}

/// Catálogo de etiquetas suportadas, da mais longa para a mais curta.
pub static FIELDS: &[FieldDescriptor] = &[
    // 7
    FieldDescriptor::integer("SINSTS1"),
    FieldDescriptor::integer("SINSTS2"),
    FieldDescriptor::integer("SINSTS3"),
    FieldDescriptor::text("NJOURF1", 2),
    // 6
    FieldDescriptor::integer("SINSTS"),
    FieldDescriptor::integer("SINSTI"),
    FieldDescriptor::text("NJOURF", 2),
    // 5
    FieldDescriptor::text("LTARF", 16),
    FieldDescriptor::integer("IRMS1"),
    FieldDescriptor::integer("IRMS2"),
    FieldDescriptor::integer("IRMS3"),
    FieldDescriptor::integer("URMS1"),
    FieldDescriptor::integer("URMS2"),
    FieldDescriptor::integer("URMS3"),
    FieldDescriptor::integer("PCOUP"),
    // 4
    FieldDescriptor::text("ADSC", 12),
    FieldDescriptor::text("VTIC", 2),
    FieldDescriptor::text("NGTF", 16),
    FieldDescriptor::integer("EAST"),
    FieldDescriptor::integer("EAIT"),
    FieldDescriptor::integer("PREF"),
    FieldDescriptor::text("STGE", 8),
    FieldDescriptor::text("MSG1", 32),
    FieldDescriptor::text("NTAF", 2),
];

/// Procura o descritor da etiqueta que abre a linha.
pub fn lookup(body: &[u8]) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|desc| desc.matches(body))
}

/// Extrai e converte o dado de uma linha já identificada.
///
/// Retorna `None` se a linha termina antes do início do dado.
pub fn decode_value(desc: &FieldDescriptor, body: &[u8]) -> Option<String> {
    let raw = body.get(desc.offset..)?;
    let raw = match desc.width {
        Width::Fixed(n) => &raw[..raw.len().min(n)],
        Width::ToEnd => raw,
    };

    match desc.kind {
        FieldKind::Text => Some(normalize_text(raw)),
        FieldKind::Integer => Some(parse_integer(raw).to_string()),
    }
}

/// Decodifica uma linha validada e grava o resultado no `store`.
///
/// Etiquetas fora do catálogo não são erro: a linha é ignorada.
pub fn dispatch(body: &[u8], store: &mut ValueStore) {
    let Some(desc) = lookup(body) else {
        trace!("Etiqueta não suportada: {}", String::from_utf8_lossy(label_of(body)));
        return;
    };

    let Some(value) = decode_value(desc, body) else {
        debug!("{}: linha sem dado", desc.label);
        return;
    };

    if let Err(e) = store.upsert(desc.label, &value) {
        debug!("{}: valor '{}' rejeitado: {e}", desc.label, value);
    }
}

/// Copia o texto trocando tabulações por espaços.
fn normalize_text(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| if b == SEPARATOR { ' ' } else { char::from(b) })
        .collect()
}

/// Conversão decimal tolerante, no estilo `atol`.
///
/// Ignora espaços iniciais, aceita um sinal opcional e para no primeiro
/// caractere não numérico. Sem nenhum dígito o resultado é 0. Valores fora
/// da faixa de `i64` saturam.
pub fn parse_integer(raw: &[u8]) -> i64 {
    let mut bytes = raw.iter().copied().skip_while(u8::is_ascii_whitespace).peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let magnitude = bytes
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// Trecho inicial da linha até o primeiro separador (só para log).
fn label_of(body: &[u8]) -> &[u8] {
    let end = body
        .iter()
        .position(|&b| b == SEPARATOR || b == b' ')
        .unwrap_or(body.len());
    &body[..end]
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

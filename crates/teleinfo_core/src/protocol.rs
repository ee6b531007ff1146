//! Protocolo Teleinfo (modo standard) – constantes de fio e checksum.
//!
//! Formato de uma linha (grupo de informação):
//!
//! ```text
//! ┌─────────┬───────────┬─────┬───────────┬─────┬──────────┬─────────┐
//! │ LF 0x0A │ ETIQUETA  │ TAB │ DADO      │ TAB │ CHECKSUM │ CR 0x0D │
//! └─────────┴───────────┴─────┴───────────┴─────┴──────────┴─────────┘
//! ```
//!
//! - Caracteres de 7 bits (o bit de paridade é descartado)
//! - Checksum cobre tudo entre LF (exclusivo) e o próprio checksum
//! - Comprimento total entre [`FRAME_MIN_LEN`] e [`FRAME_MAX_LEN`], contando o CR

/// Marcador de início de linha (LF).
pub const FRAME_START: u8 = 0x0A;

/// Marcador de fim de linha (CR).
pub const FRAME_END: u8 = 0x0D;

/// Separador entre etiqueta e dado (modo standard).
pub const SEPARATOR: u8 = 0x09;

/// Comprimento mínimo de uma linha, incluindo o CR.
pub const FRAME_MIN_LEN: usize = 5;

/// Comprimento máximo de uma linha, incluindo o CR.
pub const FRAME_MAX_LEN: usize = 125;

/// Capacidade do buffer de montagem (o CR nunca é armazenado).
pub const FRAME_CAPACITY: usize = FRAME_MAX_LEN - 1;

/// Máscara de 7 bits aplicada a cada byte recebido.
pub const SEVEN_BIT_MASK: u8 = 0x7F;

/// Motivos para descartar uma linha.
///
/// Nunca chegam ao chamador de `process`: o link serial é ruidoso e a
/// linha é apenas registrada em log e descartada.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Linha muito curta ({0} bytes, mínimo {FRAME_MIN_LEN})")]
    TooShort(usize),

    #[error("Linha muito longa ({0} bytes, máximo {FRAME_MAX_LEN})")]
    TooLong(usize),

    #[error("Checksum inválido: 0x{found:02X} (esperado 0x{expected:02X})")]
    ChecksumMismatch { expected: u8, found: u8 },
}

/// Calcula o checksum Teleinfo de uma sequência de bytes.
///
/// Soma de 8 bits (com wraparound), mantém os 6 bits baixos e soma `0x20`,
/// o que sempre produz um caractere ASCII imprimível.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (sum & 0x3F) + 0x20
}

/// Valida o conteúdo acumulado entre LF e CR.
///
/// `raw` termina com o byte de checksum. Retorna o corpo sem o checksum.
pub fn validate_frame(raw: &[u8]) -> Result<&[u8], FrameError> {
    let len = raw.len() + 1;
    if len < FRAME_MIN_LEN {
        return Err(FrameError::TooShort(len));
    }
    if len > FRAME_MAX_LEN {
        return Err(FrameError::TooLong(len));
    }

    let (body, found) = raw.split_at(raw.len() - 1);
    let found = found[0];
    let expected = checksum(body);
    if expected != found {
        return Err(FrameError::ChecksumMismatch { expected, found });
    }

    Ok(body)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

//! Máquina de estados que monta linhas Teleinfo byte a byte.
//!
//! Um único buffer de capacidade fixa é reutilizado para todas as linhas.
//! Qualquer linha incompleta, longa demais ou com checksum errado é
//! simplesmente descartada; a ressincronização acontece no próximo LF.

use crate::protocol::{
    FRAME_CAPACITY, FRAME_END, FRAME_START, SEVEN_BIT_MASK, validate_frame,
};
use tracing::debug;

/// Estado da montagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Aguardando um LF; todos os outros bytes são ignorados.
    Idle,
    /// Entre LF e CR, acumulando bytes.
    Accumulating,
}

/// Montador de linhas Teleinfo.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buffer: [u8; FRAME_CAPACITY],
    /// Cursor de escrita (quantidade de bytes acumulados)
    cursor: usize,
    state: State,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buffer: [0; FRAME_CAPACITY],
            cursor: 0,
            state: State::Idle,
        }
    }

    /// Alimenta um byte recebido.
    ///
    /// Retorna o corpo da linha (sem checksum) quando um CR fecha uma linha
    /// válida. O slice empresta o buffer interno e só vale até o próximo `push`.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        let byte = byte & SEVEN_BIT_MASK;

        match (byte, self.state) {
            (FRAME_START, _) => {
                if self.cursor > 0 {
                    debug!("LF no meio de uma linha, descartando {} bytes", self.cursor);
                }
                self.cursor = 0;
                self.state = State::Accumulating;
                None
            }
            (FRAME_END, State::Accumulating) => {
                let len = self.cursor;
                self.reset();
                match validate_frame(&self.buffer[..len]) {
                    Ok(body) => Some(body),
                    Err(e) => {
                        debug!("Linha descartada: {e}");
                        None
                    }
                }
            }
            (_, State::Accumulating) => {
                if self.cursor < FRAME_CAPACITY {
                    self.buffer[self.cursor] = byte;
                    self.cursor += 1;
                } else {
                    debug!("Linha sem CR excedeu {FRAME_CAPACITY} bytes, ressincronizando");
                    self.reset();
                }
                None
            }
            (_, State::Idle) => None,
        }
    }

    /// Quantidade de bytes acumulados na linha em curso.
    pub fn pending(&self) -> usize {
        self.cursor
    }

    /// `true` se há uma linha em montagem (após um LF).
    pub fn is_accumulating(&self) -> bool {
        self.state == State::Accumulating
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.state = State::Idle;
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::checksum;
    use proptest::prelude::*;

    fn wire(body: &[u8]) -> Vec<u8> {
        let mut out = vec![FRAME_START];
        out.extend_from_slice(body);
        out.push(checksum(body));
        out.push(FRAME_END);
        out
    }

    /// Alimenta todos os bytes e coleta os corpos entregues.
    fn feed(asm: &mut FrameAssembler, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut bodies = Vec::new();
        for &b in bytes {
            if let Some(body) = asm.push(b) {
                bodies.push(body.to_vec());
            }
        }
        bodies
    }

    #[test]
    fn delivers_valid_frame() {
        let mut asm = FrameAssembler::new();
        let bodies = feed(&mut asm, &wire(b"ADSC\t012345678901\t"));
        assert_eq!(bodies, vec![b"ADSC\t012345678901\t".to_vec()]);
        assert!(!asm.is_accumulating());
        assert_eq!(asm.pending(), 0);
    }

    #[test]
    fn masks_parity_bit() {
        let mut asm = FrameAssembler::new();
        let with_parity: Vec<u8> = wire(b"VTIC\t02\t").iter().map(|b| b | 0x80).collect();
        let bodies = feed(&mut asm, &with_parity);
        assert_eq!(bodies, vec![b"VTIC\t02\t".to_vec()]);
    }

    #[test]
    fn ignores_bytes_before_start() {
        let mut asm = FrameAssembler::new();
        let mut bytes = b"garbage\t1\t".to_vec();
        bytes.push(checksum(b"garbage\t1\t"));
        bytes.push(FRAME_END);
        assert!(feed(&mut asm, &bytes).is_empty());
        assert!(!asm.is_accumulating());
    }

    #[test]
    fn start_marker_drops_partial_frame() {
        let mut asm = FrameAssembler::new();
        let mut bytes = vec![FRAME_START];
        bytes.extend_from_slice(b"IRMS1\t0");
        bytes.extend_from_slice(&wire(b"IRMS2\t004\t"));
        assert_eq!(feed(&mut asm, &bytes), vec![b"IRMS2\t004\t".to_vec()]);
    }

    #[test]
    fn rejects_flipped_checksum() {
        let mut asm = FrameAssembler::new();
        let mut bytes = wire(b"SINSTS\t01500\t");
        let cs = bytes.len() - 2;
        bytes[cs] ^= 0x04;
        assert!(feed(&mut asm, &bytes).is_empty());
        assert_eq!(asm.pending(), 0);
    }

    #[test]
    fn overflow_resynchronizes_on_next_start() {
        let mut asm = FrameAssembler::new();
        let mut bytes = vec![FRAME_START];
        bytes.extend(std::iter::repeat_n(b'X', 130));
        bytes.push(FRAME_END);
        bytes.extend_from_slice(&wire(b"PREF\t12\t"));
        assert_eq!(feed(&mut asm, &bytes), vec![b"PREF\t12\t".to_vec()]);
    }

    #[test]
    fn overflow_tail_never_forms_a_frame() {
        // Os 4 bytes após o overflow formariam uma linha válida se o cursor
        // continuasse acumulando.
        let mut asm = FrameAssembler::new();
        let mut bytes = vec![FRAME_START];
        bytes.extend(std::iter::repeat_n(b'X', FRAME_CAPACITY));
        bytes.push(b'Y');
        bytes.extend_from_slice(b"ABC");
        bytes.push(checksum(b"ABC"));
        bytes.push(FRAME_END);
        assert!(feed(&mut asm, &bytes).is_empty());
    }

    #[test]
    fn end_marker_while_idle_is_ignored() {
        let mut asm = FrameAssembler::new();
        assert!(asm.push(FRAME_END).is_none());
        assert!(!asm.is_accumulating());
    }

    #[test]
    fn consecutive_frames() {
        let mut asm = FrameAssembler::new();
        let mut bytes = wire(b"URMS1\t230\t");
        bytes.extend_from_slice(&wire(b"URMS2\t231\t"));
        let bodies = feed(&mut asm, &bytes);
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1], b"URMS2\t231\t".to_vec());
    }

    proptest! {
        #[test]
        fn no_start_marker_means_no_frame(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let bytes: Vec<u8> = bytes
                .into_iter()
                .filter(|b| b & SEVEN_BIT_MASK != FRAME_START)
                .collect();
            let mut asm = FrameAssembler::new();
            prop_assert!(feed(&mut asm, &bytes).is_empty());
        }

        #[test]
        fn single_bit_flip_in_checksum_is_rejected(
            body in "[A-Z0-9\t ]{3,100}",
            bit in 0u8..7,
        ) {
            let mut asm = FrameAssembler::new();
            let mut bytes = wire(body.as_bytes());
            let cs = bytes.len() - 2;
            bytes[cs] ^= 1 << bit;
            // Um checksum que vira LF/CR muda o enquadramento, não só o valor
            prop_assume!(bytes[cs] != FRAME_START && bytes[cs] != FRAME_END);
            prop_assert!(feed(&mut asm, &bytes).is_empty());
        }
    }
}

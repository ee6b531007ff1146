//! API pública: alimenta bytes e consulta os valores decodificados.

use crate::assembler::FrameAssembler;
use crate::fields;
use crate::store::ValueStore;
use crate::types::MeterSnapshot;
use tracing::debug;

/// Decodificador Teleinfo completo.
///
/// Reativo e síncrono: só faz algo quando recebe um byte. Deve ser
/// alimentado na ordem de chegada, por um único escritor.
#[derive(Debug, Clone, Default)]
pub struct Teleinfo {
    assembler: FrameAssembler,
    store: ValueStore,
}

impl Teleinfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processa um byte recebido do link serial.
    pub fn process(&mut self, byte: u8) {
        if let Some(body) = self.assembler.push(byte) {
            fields::dispatch(body, &mut self.store);
        }
    }

    /// Processa um bloco de bytes, na ordem.
    pub fn process_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.process(b);
        }
    }

    /// Acesso de leitura aos valores decodificados.
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    /// Copia o valor de `name` para `out`; `false` se a etiqueta é desconhecida.
    pub fn value_get(&self, name: &str, out: &mut String) -> bool {
        self.store.copy_value(name, out)
    }

    /// Registra todas as entradas em log (nível debug) e retorna a quantidade.
    pub fn values_dump(&self) -> usize {
        for (index, (name, value)) in self.store.iter().enumerate() {
            debug!("{}) {}='{}'", index + 1, name, value);
        }
        self.store.len()
    }

    /// Visão tipada derivada do estado atual.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot::from_store(&self.store)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FRAME_END, FRAME_START, checksum};
    use proptest::prelude::*;

    /// Monta uma linha completa no formato de fio: LF, corpo, checksum, CR.
    fn frame(label: &str, value: &str) -> Vec<u8> {
        let body = format!("{label}\t{value}\t");
        let mut out = vec![FRAME_START];
        out.extend_from_slice(body.as_bytes());
        out.push(checksum(body.as_bytes()));
        out.push(FRAME_END);
        out
    }

    fn get(tic: &Teleinfo, name: &str) -> Option<String> {
        let mut out = String::new();
        tic.value_get(name, &mut out).then_some(out)
    }

    #[test]
    fn decodes_adsc() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("ADSC", "012345678901"));
        assert_eq!(get(&tic, "ADSC").as_deref(), Some("012345678901"));
        assert_eq!(tic.values_dump(), 1);
    }

    #[test]
    fn integer_is_canonicalized() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("IRMS1", "007"));
        assert_eq!(get(&tic, "IRMS1").as_deref(), Some("7"));
    }

    #[test]
    fn repeated_label_updates_in_place() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("SINSTS", "1500"));
        let count = tic.values_dump();
        tic.process_bytes(&frame("SINSTS", "1600"));
        assert_eq!(tic.values_dump(), count);
        assert_eq!(get(&tic, "SINSTS").as_deref(), Some("1600"));
    }

    #[test]
    fn same_frame_twice_is_stable() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("VTIC", "02"));
        tic.process_bytes(&frame("VTIC", "02"));
        assert_eq!(tic.store().len(), 1);
    }

    #[test]
    fn oversized_frame_then_valid_frame() {
        let mut tic = Teleinfo::new();
        let mut bytes = vec![FRAME_START];
        bytes.extend(std::iter::repeat_n(b'A', 130));
        bytes.push(FRAME_END);
        tic.process_bytes(&bytes);
        assert!(tic.store().is_empty());

        tic.process_bytes(&frame("PREF", "12"));
        assert_eq!(get(&tic, "PREF").as_deref(), Some("12"));
        assert_eq!(tic.store().len(), 1);
    }

    #[test]
    fn prefix_labels_update_their_own_entry() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("SINSTS1", "00500"));
        assert_eq!(get(&tic, "SINSTS1").as_deref(), Some("500"));
        assert_eq!(get(&tic, "SINSTS"), None);

        tic.process_bytes(&frame("SINSTS", "01200"));
        assert_eq!(get(&tic, "SINSTS").as_deref(), Some("1200"));
        assert_eq!(get(&tic, "SINSTS1").as_deref(), Some("500"));
    }

    #[test]
    fn unknown_label_produces_no_entry() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("RELAIS", "000"));
        assert_eq!(tic.values_dump(), 0);
    }

    #[test]
    fn tabs_are_normalized() {
        let mut tic = Teleinfo::new();
        tic.process_bytes(&frame("LTARF", "HEURE\tCREUSE"));
        assert_eq!(get(&tic, "LTARF").as_deref(), Some("HEURE CREUSE "));
    }

    #[test]
    fn full_group_of_lines() {
        let mut tic = Teleinfo::new();
        // Início de grupo STX/ETX e ruído entre linhas são ignorados
        let mut bytes = vec![0x02];
        for (label, value) in [
            ("ADSC", "041876097463"),
            ("VTIC", "02"),
            ("NGTF", "     TEMPO      "),
            ("EAST", "003518612"),
            ("IRMS1", "004"),
            ("URMS1", "233"),
            ("PREF", "09"),
            ("PCOUP", "09"),
            ("SINSTS", "00931"),
            ("SMAXSN", "E240101065311\t03200"),
            ("STGE", "003A0001"),
        ] {
            bytes.extend_from_slice(&frame(label, value));
        }
        bytes.push(0x03);
        tic.process_bytes(&bytes);

        assert_eq!(tic.store().len(), 10);
        let snap = tic.snapshot();
        assert_eq!(snap.info.adsc, "041876097463");
        assert_eq!(snap.info.ngtf, "     TEMPO      ");
        assert_eq!(snap.info.stge, "003A0001");
        assert_eq!(snap.energy.east, 3_518_612);
        assert_eq!(snap.phases[0].irms, 4);
        assert_eq!(snap.phases[0].urms, 233);
        assert_eq!(snap.power.pref, 9);
        assert_eq!(snap.power.sinsts, 931);
    }

    proptest! {
        #[test]
        fn longer_value_always_readable(values in proptest::collection::vec(0u32..10_000_000, 1..20)) {
            let mut tic = Teleinfo::new();
            for v in values {
                tic.process_bytes(&frame("EAIT", &v.to_string()));
                prop_assert_eq!(get(&tic, "EAIT"), Some(v.to_string()));
                prop_assert_eq!(tic.store().len(), 1);
            }
        }

        #[test]
        fn text_roundtrip(value in "[A-Z0-9 ]{12}") {
            let mut tic = Teleinfo::new();
            tic.process_bytes(&frame("ADSC", &value));
            prop_assert_eq!(get(&tic, "ADSC"), Some(value));
        }
    }
}

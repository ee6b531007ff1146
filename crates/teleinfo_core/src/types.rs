//! Visão tipada dos valores decodificados.
//!
//! O [`ValueStore`] é a única fonte de verdade; [`MeterSnapshot`] é sempre
//! derivado dele sob demanda e nunca atualizado em paralelo.

use crate::fields::parse_integer;
use crate::store::ValueStore;
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Identificação e tarifa
// ──────────────────────────────────────────────

/// Dados de identificação do medidor e do contrato.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeterInfo {
    /// Endereço secundário do medidor (ADSC)
    pub adsc: String,
    /// Versão da TIC (VTIC)
    pub vtic: String,
    /// Nome do calendário tarifário do fornecedor (NGTF)
    pub ngtf: String,
    /// Rótulo da tarifa em curso (LTARF)
    pub ltarf: String,
    /// Registro de status, hexadecimal (STGE)
    pub stge: String,
    /// Mensagem curta (MSG1)
    pub msg1: String,
    /// Índice da tarifa em curso (NTAF)
    pub ntaf: String,
    /// Número do dia em curso no calendário (NJOURF)
    pub njourf: String,
    /// Número do próximo dia no calendário (NJOURF1)
    pub njourf1: String,
}

// ──────────────────────────────────────────────
// Energia
// ──────────────────────────────────────────────

/// Índices totais de energia.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnergyData {
    /// Energia ativa consumida total (Wh)
    pub east: u64,
    /// Energia ativa injetada total (Wh)
    pub eait: u64,
}

// ──────────────────────────────────────────────
// Rede elétrica
// ──────────────────────────────────────────────

/// Corrente e tensão por fase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhaseData {
    /// Corrente eficaz (A)
    pub irms: u32,
    /// Tensão eficaz (V)
    pub urms: u32,
    /// Potência aparente instantânea consumida (VA)
    pub sinsts: u32,
}

/// Potências.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PowerData {
    /// Potência de referência contratada (kVA)
    pub pref: u32,
    /// Potência de corte (kVA)
    pub pcoup: u32,
    /// Potência aparente instantânea consumida, total (VA)
    pub sinsts: u32,
    /// Potência aparente instantânea injetada (VA)
    pub sinsti: u32,
}

// ──────────────────────────────────────────────
// Snapshot completo
// ──────────────────────────────────────────────

/// Snapshot tipado de todas as etiquetas do catálogo.
///
/// Etiquetas ainda não recebidas ficam com o valor padrão (vazio / 0).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeterSnapshot {
    pub info: MeterInfo,
    pub energy: EnergyData,
    pub power: PowerData,
    /// Fases 1, 2 e 3
    pub phases: [PhaseData; 3],
}

impl MeterSnapshot {
    /// Deriva o snapshot a partir do estado atual do `store`.
    pub fn from_store(store: &ValueStore) -> Self {
        let text = |name: &str| store.get(name).unwrap_or_default().to_owned();
        let int = |name: &str| store.get(name).map_or(0, |v| parse_integer(v.as_bytes()));
        let u32_of = |name: &str| u32::try_from(int(name)).unwrap_or(0);
        let u64_of = |name: &str| u64::try_from(int(name)).unwrap_or(0);

        Self {
            info: MeterInfo {
                adsc: text("ADSC"),
                vtic: text("VTIC"),
                ngtf: text("NGTF"),
                ltarf: text("LTARF"),
                stge: text("STGE"),
                msg1: text("MSG1"),
                ntaf: text("NTAF"),
                njourf: text("NJOURF"),
                njourf1: text("NJOURF1"),
            },
            energy: EnergyData {
                east: u64_of("EAST"),
                eait: u64_of("EAIT"),
            },
            power: PowerData {
                pref: u32_of("PREF"),
                pcoup: u32_of("PCOUP"),
                sinsts: u32_of("SINSTS"),
                sinsti: u32_of("SINSTI"),
            },
            phases: [
                PhaseData {
                    irms: u32_of("IRMS1"),
                    urms: u32_of("URMS1"),
                    sinsts: u32_of("SINSTS1"),
                },
                PhaseData {
                    irms: u32_of("IRMS2"),
                    urms: u32_of("URMS2"),
                    sinsts: u32_of("SINSTS2"),
                },
                PhaseData {
                    irms: u32_of("IRMS3"),
                    urms: u32_of("URMS3"),
                    sinsts: u32_of("SINSTS3"),
                },
            ],
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

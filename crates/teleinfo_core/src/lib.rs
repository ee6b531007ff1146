//! # Teleinfo Core
//!
//! Decodificador streaming da Teleinfo (TIC, modo standard) dos medidores
//! elétricos franceses. Recebe os bytes do link serial um a um, monta e
//! valida as linhas e mantém o último valor conhecido de cada etiqueta.
//!
//! ## Módulos
//! - [`protocol`] – Constantes de fio e checksum
//! - [`assembler`] – Máquina de estados LF…CR com buffer fixo
//! - [`fields`] – Catálogo de etiquetas e conversão dos dados
//! - [`store`] – Armazenamento nome → valor
//! - [`types`] – Snapshot tipado derivado do store
//! - [`decoder`] – API pública ([`Teleinfo`])
//! - [`config`] – Configuração TOML da aplicação

pub mod protocol;
pub mod assembler;
pub mod fields;
pub mod store;
pub mod types;
pub mod decoder;
pub mod config;

// Re-exports convenientes
pub use decoder::Teleinfo;
pub use store::{Entry, StoreError, ValueStore};
pub use types::MeterSnapshot;
pub use config::{AppConfig, ReaderConfig};

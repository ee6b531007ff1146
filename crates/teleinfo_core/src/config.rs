//! Configuração via TOML.
//!
//! O decodificador em si não tem parâmetros; a configuração descreve apenas
//! de onde a aplicação lê os bytes e com que frequência registra os valores.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Tamanho máximo de leitura por chamada.
const MAX_READ_CHUNK: usize = 65536;

/// Configuração do Reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Origem dos bytes: arquivo, dispositivo tty já configurado ou "-" (stdin)
    pub input: String,
    /// Intervalo entre dumps dos valores (segundos)
    pub dump_interval_secs: f64,
    /// Bytes lidos por chamada
    pub read_chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            input: "/dev/ttyUSB0".into(),
            dump_interval_secs: 10.0,
            read_chunk_size: 256,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reader: ReaderConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.reader.input.trim().is_empty() {
            errors.push("Entrada do reader não pode ser vazia".into());
        }
        if !(0.1..=3600.0).contains(&self.reader.dump_interval_secs) {
            errors.push(format!(
                "Intervalo de dump inválido: {} (0.1–3600.0)",
                self.reader.dump_interval_secs
            ));
        }
        if self.reader.read_chunk_size == 0 || self.reader.read_chunk_size > MAX_READ_CHUNK {
            errors.push(format!(
                "Tamanho de leitura inválido: {} (1–{MAX_READ_CHUNK})",
                self.reader.read_chunk_size
            ));
        }

        errors
    }
}

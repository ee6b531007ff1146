//! # Teleinfo Reader
//!
//! Lê o link serial do medidor (ou um arquivo de captura) e registra em log
//! os valores decodificados. A porta serial deve estar configurada antes
//! (ex: `stty -F /dev/ttyUSB0 9600 cs7 parenb -parodd raw`).
//!
//! ## Uso
//! ```bash
//! teleinfo_reader                    # Entrada do config.toml
//! teleinfo_reader /dev/ttyUSB0       # Sobrescreve a entrada
//! teleinfo_reader - < captura.bin    # Lê da stdin
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use teleinfo_core::Teleinfo;
use teleinfo_core::config::AppConfig;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let mut config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    if let Some(input) = std::env::args().nth(1) {
        config.reader.input = input;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    let reader_cfg = &config.reader;
    let mut input: Box<dyn Read> = if reader_cfg.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(&reader_cfg.input) {
            Ok(file) => Box::new(file),
            Err(e) => {
                error!("Falha ao abrir {}: {e}", reader_cfg.input);
                return ExitCode::FAILURE;
            }
        }
    };

    info!(
        "Lendo Teleinfo de {} (dump a cada {:.1}s)",
        reader_cfg.input, reader_cfg.dump_interval_secs
    );

    let interval = Duration::from_secs_f64(reader_cfg.dump_interval_secs);
    let mut tic = Teleinfo::new();
    let mut buf = vec![0u8; reader_cfg.read_chunk_size];
    let mut last_dump = Instant::now();
    let mut total_bytes = 0usize;

    // ── Loop principal ──
    loop {
        match input.read(&mut buf) {
            Ok(0) => {
                info!("Fim da entrada após {total_bytes} bytes");
                break;
            }
            Ok(n) => {
                total_bytes += n;
                tic.process_bytes(&buf[..n]);
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Erro de leitura: {e}");
                dump(&tic);
                return ExitCode::FAILURE;
            }
        }

        if last_dump.elapsed() >= interval {
            dump(&tic);
            last_dump = Instant::now();
        }
    }

    dump(&tic);
    ExitCode::SUCCESS
}

/// Registra o estado atual do decodificador.
fn dump(tic: &Teleinfo) {
    let count = tic.values_dump();
    let snap = tic.snapshot();
    info!(
        "{} etiquetas | ADSC {} | EAST {} Wh | SINSTS {} VA | I {}/{}/{} A | U {}/{}/{} V",
        count,
        snap.info.adsc,
        snap.energy.east,
        snap.power.sinsts,
        snap.phases[0].irms,
        snap.phases[1].irms,
        snap.phases[2].irms,
        snap.phases[0].urms,
        snap.phases[1].urms,
        snap.phases[2].urms,
    );
    for (name, value) in tic.store().iter() {
        info!("  {name} = {value}");
    }
}

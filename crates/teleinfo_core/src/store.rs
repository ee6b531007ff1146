//! Armazenamento dos últimos valores conhecidos, por etiqueta.
//!
//! Os valores ficam como texto, na mesma forma que trafegam na linha.
//! Uma atualização reaproveita a alocação existente quando o novo valor cabe
//! nela; caso contrário a entrada é recriada no fim da lista. Por isso a ordem
//! de enumeração não é estável entre atualizações.

use std::collections::TryReserveError;
use tracing::trace;

/// Erros de [`ValueStore::upsert`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Nome vazio")]
    EmptyName,

    #[error("Valor vazio")]
    EmptyValue,

    #[error("Falha de alocação: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Uma medida decodificada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    value: String,
}

impl Entry {
    /// Cria uma entrada com alocação exata para nome e valor.
    fn try_new(name: &str, value: &str) -> Result<Self, StoreError> {
        Ok(Self {
            name: exact_string(name)?,
            value: exact_string(value)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Bytes disponíveis para o valor sem realocar.
    pub fn capacity(&self) -> usize {
        self.value.capacity()
    }
}

/// Coleção nome → valor, na ordem de inserção (ver doc do módulo).
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    entries: Vec<Entry>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere ou atualiza o valor de `name`.
    ///
    /// - valor igual ao atual: nada muda
    /// - cabe na capacidade atual: sobrescreve no lugar
    /// - não cabe: a entrada é recriada no fim da lista
    ///
    /// Em falha de alocação o conteúdo anterior permanece intacto.
    pub fn upsert(&mut self, name: &str, value: &str) -> Result<&Entry, StoreError> {
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if value.is_empty() {
            return Err(StoreError::EmptyValue);
        }

        let Some(index) = self.position(name) else {
            let entry = Entry::try_new(name, value)?;
            self.entries.try_reserve(1)?;
            self.entries.push(entry);
            trace!("Novo: {name}={value}");
            return Ok(&self.entries[self.entries.len() - 1]);
        };

        if self.entries[index].value == value {
            return Ok(&self.entries[index]);
        }

        if self.entries[index].capacity() >= value.len() {
            let entry = &mut self.entries[index];
            entry.value.clear();
            entry.value.push_str(value);
            trace!("Atualizado: {name}={value}");
            return Ok(&self.entries[index]);
        }

        // Aloca antes de remover para não perder a entrada antiga em caso de falha
        let entry = Entry::try_new(name, value)?;
        self.entries.remove(index);
        self.entries.push(entry);
        trace!("Realocado: {name}={value}");
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Valor atual de `name`, se conhecido.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].value())
    }

    /// Copia o valor de `name` para `out`. Sem a etiqueta, `out` não é tocado.
    pub fn copy_value(&self, name: &str, out: &mut String) -> bool {
        match self.get(name) {
            Some(value) => {
                out.clear();
                out.push_str(value);
                true
            }
            None => false,
        }
    }

    /// Percorre as entradas na ordem interna.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.name(), e.value()))
    }

    /// Cópia das entradas, para diagnóstico.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        // Comparação exata de tamanho e bytes, sem case-folding
        self.entries.iter().position(|e| e.name == name)
    }
}

fn exact_string(s: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())?;
    out.push_str(s);
    Ok(out)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

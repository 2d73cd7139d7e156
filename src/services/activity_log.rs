// src/services/activity_log.rs
//
// Trilha de auditoria como canal lateral. Falhar ao gravar um log nunca
// derruba a operação descrita: a falha vira `warn!` e incrementa um contador.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    db::LogStore,
    models::{
        log::{LogAction, LogTarget, NewLogEntry},
        user::User,
    },
};

#[derive(Clone)]
enum LogSink {
    // Grava na hora, ainda dentro da requisição
    Direct(Arc<dyn LogStore>),
    // Fila para o worker em segundo plano
    Queue(mpsc::Sender<NewLogEntry>),
}

#[derive(Clone)]
pub struct ActivityLogger {
    sink: LogSink,
    failures: Arc<AtomicU64>,
}

impl ActivityLogger {
    pub fn direct(store: Arc<dyn LogStore>) -> Self {
        Self {
            sink: LogSink::Direct(store),
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sobe o worker que esvazia a fila. Precisa de um runtime tokio ativo.
    pub fn spawn(store: Arc<dyn LogStore>, buffer: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<NewLogEntry>(buffer.max(1));
        let failures = Arc::new(AtomicU64::new(0));

        let worker_failures = failures.clone();
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let action = entry.action.clone();
                if let Err(e) = store.append(entry).await {
                    worker_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("⚠️ Falha ao gravar log de atividade ({}): {}", action, e);
                }
            }
            tracing::info!("Fila de logs de atividade encerrada");
        });

        Self {
            sink: LogSink::Queue(tx),
            failures,
        }
    }

    pub async fn record(
        &self,
        actor: &User,
        ip: Option<&str>,
        action: LogAction,
        target: LogTarget,
        target_id: Option<Uuid>,
    ) {
        let entry = NewLogEntry {
            user_id: actor.id,
            user_role: actor.role,
            action: action.as_str().to_string(),
            target: target.as_str().to_string(),
            target_id,
            ip: ip.map(str::to_string),
        };

        match &self.sink {
            LogSink::Direct(store) => {
                if let Err(e) = store.append(entry).await {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("⚠️ Falha ao gravar log de atividade ({}): {}", action.as_str(), e);
                }
            }
            LogSink::Queue(tx) => {
                if let Err(e) = tx.try_send(entry) {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("⚠️ Log de atividade descartado ({}): {}", action.as_str(), e);
                }
            }
        }
    }

    /// Quantos logs se perderam desde a subida.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

//! 读一个批次，翻译，写出，如此往复
//!
//! 溢出时不继续读批次，而是先走 `resync` 拿快照

use tracing::info;

use crate::error::Result;
use crate::event_dispatcher::Emitter;
use crate::event_model::{EventLine, RawEvent};
use crate::input_devices::{Batch, EventSource};
use crate::tablet_driver::Translator;
use crate::virtual_device::TabletSink;

pub const TRACE_TARGET: &str = "tablet_relay::trace";

pub struct Router<E, S> {
    source: E,
    translator: Translator,
    emitter: Emitter<S>,
}

impl<E: EventSource, S: TabletSink> Router<E, S> {
    pub fn new(source: E, translator: Translator, sink: S) -> Self {
        Self {
            source,
            translator,
            emitter: Emitter::new(sink),
        }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    /// 启动时的「靠近再离开」
    pub fn announce(&mut self) -> Result<()> {
        self.translator.announce(&mut self.emitter)?;
        Ok(())
    }

    /// 一直跑到出错为止，没有正常结束的路径
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.step().await?;
        }
    }

    /// 处理一个批次，或者一次溢出加快照
    pub async fn step(&mut self) -> Result<()> {
        match self.source.next_batch().await? {
            Batch::Events(events) => {
                trace_events(&events);
                self.translator
                    .translate_batch(&events, &mut self.emitter)?;
            }
            Batch::Overflow(marker) => {
                trace_events(std::slice::from_ref(&marker));
                let snapshot = self.source.resync()?;
                trace_events(&snapshot);
                self.translator.resync(&snapshot, &mut self.emitter)?;
            }
        }
        Ok(())
    }
}

fn trace_events(events: &[RawEvent]) {
    for event in events {
        info!(target: TRACE_TARGET, "{}", EventLine(event));
    }
}

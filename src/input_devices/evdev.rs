use std::fs::{File, OpenOptions};
use std::io;
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use evdev_rs::enums::{EV_SYN, EventCode, EventType};
use evdev_rs::{Device, DeviceWrapper, ReadFlag, ReadStatus};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::describe::supported_codes;
use crate::error::{Error, Result};
use crate::event_model::RawEvent;

/// 读一次得到的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// 以 SYN_REPORT 结尾的一组事件
    Events(Vec<RawEvent>),
    /// 内核缓冲区溢出，中间丢了事件，附带 SYN_DROPPED 本身。
    /// 收到之后必须调用 `resync`，不能继续读批次
    Overflow(RawEvent),
}

/// 原始事件的来源
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// 等到下一个批次，只有这里会挂起
    async fn next_batch(&mut self) -> Result<Batch>;

    /// 溢出之后的完整状态快照，每个按键和坐标轴一条
    fn resync(&mut self) -> Result<Vec<RawEvent>>;
}

/// 把逐条读出的事件切成批次
///
/// 和设备无关，`EvdevSource` 把 libevdev 的读取结果喂进来
#[derive(Debug, Default)]
pub struct Framer {
    pending: Vec<RawEvent>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 还没凑成批次的事件
    pub fn pending(&self) -> &[RawEvent] {
        &self.pending
    }

    pub fn push(&mut self, status: ReadStatus, event: RawEvent) -> Option<Batch> {
        match status {
            ReadStatus::Success => {
                let done = event.is_sync_report();
                self.pending.push(event);
                done.then(|| Batch::Events(mem::take(&mut self.pending)))
            }
            ReadStatus::Sync => {
                // 上一个 SYN_REPORT 之后的事件已经不完整了
                self.pending.clear();
                Some(Batch::Overflow(event))
            }
        }
    }

    /// 一直读到凑出一个批次，读到 `WouldBlock` 就返回 `None`，半截的批次留着下次接着凑
    pub fn read<F>(&mut self, mut next: F) -> io::Result<Option<Batch>>
    where
        F: FnMut() -> io::Result<(ReadStatus, RawEvent)>,
    {
        loop {
            match next() {
                Ok((status, event)) => {
                    if let Some(batch) = self.push(status, event) {
                        return Ok(Some(batch));
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(err),
            }
        }
    }

    /// 读完同步模式下的差量，返回读了几条
    ///
    /// libevdev 读完差量之后内部状态就是最新的，差量本身不需要。
    /// 同步结束之后的普通事件放进下一个批次
    pub fn drain_sync<F>(&mut self, mut next: F) -> io::Result<usize>
    where
        F: FnMut() -> io::Result<(ReadStatus, RawEvent)>,
    {
        let mut drained = 0;
        loop {
            match next() {
                Ok((ReadStatus::Sync, _)) => drained += 1,
                Ok((ReadStatus::Success, event)) => {
                    self.pending.push(event);
                    return Ok(drained);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(drained),
                Err(err) => return Err(err),
            }
        }
    }
}

/// `/dev/input/eventX`
pub struct EvdevSource {
    path: PathBuf,
    device: Device,
    readiness: AsyncFd<File>,
    framer: Framer,
}

impl EvdevSource {
    /// 以非阻塞方式打开，需要在 tokio 运行时里调用
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|err| Error::from_io(path, err))?;
        let watched = file.try_clone()?;
        let device = Device::new_from_file(file).map_err(|err| Error::from_io(path, err))?;
        // SAFETY: `watched` 归 AsyncFd 所有，在它 drop 之前 fd 一直打开，指向同一个设备
        let readiness = unsafe { AsyncFd::register_with_interest(watched, Interest::READABLE) }
            .map_err(io::Error::from)?;
        Ok(Self {
            path: path.to_path_buf(),
            device,
            readiness,
            framer: Framer::new(),
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn next_raw(device: &Device, flags: ReadFlag) -> io::Result<(ReadStatus, RawEvent)> {
        device
            .next_event(flags)
            .map(|(status, ev)| (status, RawEvent::from(&ev)))
    }

    fn snapshot(&self) -> Vec<RawEvent> {
        let mut events: Vec<RawEvent> = [EventType::EV_KEY, EventType::EV_ABS]
            .into_iter()
            .flat_map(|ty| supported_codes(&self.device, ty))
            .filter_map(|code| {
                self.device
                    .event_value(&code)
                    .map(|value| RawEvent::new(code, value))
            })
            .collect();
        events.push(RawEvent::new(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0));
        events
    }
}

impl EventSource for EvdevSource {
    async fn next_batch(&mut self) -> Result<Batch> {
        loop {
            let device = &self.device;
            let batch = self
                .framer
                .read(|| Self::next_raw(device, ReadFlag::NORMAL))
                .map_err(|err| Error::from_io(&self.path, err))?;
            if let Some(batch) = batch {
                return Ok(batch);
            }
            let mut guard = self.readiness.readable().await?;
            guard.clear_ready();
        }
    }

    fn resync(&mut self) -> Result<Vec<RawEvent>> {
        let device = &self.device;
        self.framer
            .drain_sync(|| Self::next_raw(device, ReadFlag::SYNC))
            .map_err(|err| Error::from_io(&self.path, err))?;
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use evdev_rs::enums::{EV_ABS, EV_KEY};

    use super::*;

    type Step = io::Result<(ReadStatus, RawEvent)>;

    fn ok(event: RawEvent) -> Step {
        Ok((ReadStatus::Success, event))
    }

    fn sync(event: RawEvent) -> Step {
        Ok((ReadStatus::Sync, event))
    }

    fn abs(code: EV_ABS, value: i32) -> RawEvent {
        RawEvent::new(EventCode::EV_ABS(code), value)
    }

    fn key(code: EV_KEY, value: i32) -> RawEvent {
        RawEvent::new(EventCode::EV_KEY(code), value)
    }

    fn syn() -> RawEvent {
        RawEvent::new(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)
    }

    fn dropped() -> RawEvent {
        RawEvent::new(EventCode::EV_SYN(EV_SYN::SYN_DROPPED), 0)
    }

    /// 按顺序给出脚本里的结果，脚本读完之后一直是 `WouldBlock`
    fn script(steps: Vec<Step>) -> impl FnMut() -> Step {
        let mut steps: VecDeque<Step> = steps.into();
        move || {
            steps
                .pop_front()
                .unwrap_or_else(|| Err(io::ErrorKind::WouldBlock.into()))
        }
    }

    #[test]
    fn batch_ends_at_syn_report() {
        let mut framer = Framer::new();
        let mut next = script(vec![
            ok(abs(EV_ABS::ABS_X, 1)),
            ok(key(EV_KEY::BTN_LEFT, 1)),
            ok(syn()),
            ok(abs(EV_ABS::ABS_Y, 2)),
            ok(syn()),
        ]);

        let first = framer.read(&mut next).unwrap();
        assert_eq!(
            first,
            Some(Batch::Events(vec![
                abs(EV_ABS::ABS_X, 1),
                key(EV_KEY::BTN_LEFT, 1),
                syn()
            ]))
        );
        let second = framer.read(&mut next).unwrap();
        assert_eq!(second, Some(Batch::Events(vec![abs(EV_ABS::ABS_Y, 2), syn()])));
        assert_eq!(framer.read(&mut next).unwrap(), None);
    }

    #[test]
    fn overflow_discards_partial_frame() {
        let mut framer = Framer::new();
        let mut next = script(vec![
            ok(abs(EV_ABS::ABS_X, 10)),
            ok(abs(EV_ABS::ABS_Y, 20)),
            sync(dropped()),
        ]);
        assert_eq!(
            framer.read(&mut next).unwrap(),
            Some(Batch::Overflow(dropped()))
        );
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn partial_frame_waits_for_more_input() {
        let mut framer = Framer::new();
        assert_eq!(
            framer
                .read(script(vec![ok(abs(EV_ABS::ABS_PRESSURE, 300))]))
                .unwrap(),
            None
        );
        assert_eq!(framer.pending(), &[abs(EV_ABS::ABS_PRESSURE, 300)]);

        let batch = framer
            .read(script(vec![ok(abs(EV_ABS::ABS_X, 4)), ok(syn())]))
            .unwrap();
        assert_eq!(
            batch,
            Some(Batch::Events(vec![
                abs(EV_ABS::ABS_PRESSURE, 300),
                abs(EV_ABS::ABS_X, 4),
                syn()
            ]))
        );
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn read_errors_other_than_would_block_propagate() {
        let mut framer = Framer::new();
        let err = framer
            .read(script(vec![
                ok(abs(EV_ABS::ABS_X, 1)),
                Err(io::ErrorKind::NotFound.into()),
            ]))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn sync_drain_stops_at_would_block() {
        let mut framer = Framer::new();
        let mut next = script(vec![
            sync(key(EV_KEY::BTN_LEFT, 0)),
            sync(abs(EV_ABS::ABS_X, 7)),
            sync(syn()),
            Err(io::ErrorKind::WouldBlock.into()),
            ok(abs(EV_ABS::ABS_Y, 9)),
        ]);
        assert_eq!(framer.drain_sync(&mut next).unwrap(), 3);
        assert!(framer.pending().is_empty());
        // WouldBlock 之后的事件留给正常读取
        assert_eq!(framer.read(&mut next).unwrap(), None);
        assert_eq!(framer.pending(), &[abs(EV_ABS::ABS_Y, 9)]);
    }

    #[test]
    fn sync_drain_keeps_trailing_normal_event() {
        let mut framer = Framer::new();
        let drained = framer
            .drain_sync(script(vec![
                sync(key(EV_KEY::BTN_LEFT, 1)),
                ok(abs(EV_ABS::ABS_PRESSURE, 50)),
            ]))
            .unwrap();
        assert_eq!(drained, 1);
        assert_eq!(framer.pending(), &[abs(EV_ABS::ABS_PRESSURE, 50)]);
    }

    #[test]
    fn sync_drain_propagates_errors() {
        let mut framer = Framer::new();
        let err = framer
            .drain_sync(script(vec![Err(io::ErrorKind::PermissionDenied.into())]))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}

// ==========================================
// 装配产线 MES 服务 - PLC 会话
// ==========================================
// 职责: 在任意传输实现之上提供“断线快速失败 + 按需重连”的会话语义
// 约束: 底层链路一次只允许一个在途操作，传输访问以互斥锁串行化
// ==========================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, error, info, warn};

use crate::plc::client::PlcClient;
use crate::plc::error::{PlcError, PlcResult};

// ==========================================
// PlcTransport - 厂商传输抽象
// ==========================================

/// PLC 传输抽象
///
/// 对应厂商驱动的最小接口；错误以厂商返回的非零错误码表示。
/// 会话层负责连接状态管理，传输实现只做单次操作。
pub trait PlcTransport: Send {
    /// 打开链路；失败返回厂商错误码
    fn open(&mut self) -> Result<(), i32>;

    /// 关闭链路（幂等）
    fn close(&mut self);

    /// 读取点位；失败返回厂商错误码
    fn get_device(&mut self, device: &str) -> Result<i32, i32>;

    /// 写入点位；失败返回厂商错误码
    fn set_device(&mut self, device: &str, value: i32) -> Result<(), i32>;
}

// ==========================================
// PlcSession - 设备会话
// ==========================================

/// 设备会话
///
/// - 读写前先确认连接，未连接则快速失败
/// - 任一读写失败会把会话标记为断开，下一次 ensure_connected 时重连
/// - 所有传输访问持同一把互斥锁，满足“单在途操作”约束
pub struct PlcSession<T: PlcTransport> {
    transport: Mutex<T>,
    connected: AtomicBool,
    station_number: i32,
}

impl<T: PlcTransport> PlcSession<T> {
    /// 创建新的设备会话（尚未连接；首次 ensure_connected 时打开链路）
    pub fn new(station_number: i32, transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            connected: AtomicBool::new(false),
            station_number,
        }
    }

    /// 当前连接标记（测试/诊断用）
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl<T: PlcTransport> PlcClient for PlcSession<T> {
    fn ensure_connected(&self) -> bool {
        if self.connected.load(Ordering::SeqCst) {
            return true;
        }

        debug!("PLC 未连接，尝试建立连接。station={}", self.station_number);

        let mut transport = match self.transport.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("PLC 会话锁获取失败: {}", e);
                return false;
            }
        };

        // 拿到锁后复查，避免并发重连
        if self.connected.load(Ordering::SeqCst) {
            return true;
        }

        // 重试前先关掉可能残留的半开链路
        transport.close();

        match transport.open() {
            Ok(()) => {
                self.connected.store(true, Ordering::SeqCst);
                info!("PLC 已连接。station={}", self.station_number);
                true
            }
            Err(code) => {
                warn!(
                    "PLC 连接尝试失败。station={}, code={}，下个周期重试",
                    self.station_number, code
                );
                false
            }
        }
    }

    fn read_device(&self, device: &str) -> PlcResult<i32> {
        if !self.ensure_connected() {
            error!("PLC 未连接，无法读取点位。device={}", device);
            return Err(PlcError::NotConnected);
        }

        let mut transport = self
            .transport
            .lock()
            .map_err(|e| PlcError::LockError(e.to_string()))?;

        match transport.get_device(device) {
            Ok(value) => {
                debug!("PLC 点位读取。device={}, value={}", device, value);
                Ok(value)
            }
            Err(code) => {
                self.connected.store(false, Ordering::SeqCst);
                error!("PLC 点位读取失败。device={}, code={}", device, code);
                Err(PlcError::ReadFailed {
                    device: device.to_string(),
                    code,
                })
            }
        }
    }

    fn write_device(&self, device: &str, value: i32) -> PlcResult<()> {
        if !self.ensure_connected() {
            error!(
                "PLC 未连接，无法写入点位。device={}, value={}",
                device, value
            );
            return Err(PlcError::NotConnected);
        }

        let mut transport = self
            .transport
            .lock()
            .map_err(|e| PlcError::LockError(e.to_string()))?;

        match transport.set_device(device, value) {
            Ok(()) => {
                debug!("PLC 点位写入。device={}, value={}", device, value);
                Ok(())
            }
            Err(code) => {
                self.connected.store(false, Ordering::SeqCst);
                error!(
                    "PLC 点位写入失败。device={}, value={}, code={}",
                    device, value, code
                );
                Err(PlcError::WriteFailed {
                    device: device.to_string(),
                    value,
                    code,
                })
            }
        }
    }

    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Ok(mut transport) = self.transport.lock() {
            transport.close();
        }
        info!("PLC 连接已关闭。station={}", self.station_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plc::memory::{MemoryBus, MemoryTransport};

    fn session_with_bus() -> (PlcSession<MemoryTransport>, MemoryBus) {
        let bus = MemoryBus::default();
        let session = PlcSession::new(1, MemoryTransport::new(bus.clone()));
        (session, bus)
    }

    #[test]
    fn test_ensure_connected_retries_after_open_failure() {
        let (session, bus) = session_with_bus();

        bus.fail_open(Some(-1));
        assert!(!session.ensure_connected());
        assert!(!session.is_connected());

        bus.fail_open(None);
        assert!(session.ensure_connected());
        assert!(session.is_connected());
    }

    #[test]
    fn test_read_marks_disconnected_then_fails_fast() {
        let (session, bus) = session_with_bus();
        bus.set_point("M120", 1);
        assert_eq!(session.read_device("M120").unwrap(), 1);

        // 读失败 → 标记断开
        bus.fail_reads("M120", 0x2002);
        match session.read_device("M120") {
            Err(PlcError::ReadFailed { device, code }) => {
                assert_eq!(device, "M120");
                assert_eq!(code, 0x2002);
            }
            other => panic!("unexpected: {:?}", other.err()),
        }
        assert!(!session.is_connected());

        // 断开期间禁止重连的话，其他点位也读不了
        bus.fail_open(Some(-2));
        match session.read_device("M121") {
            Err(PlcError::NotConnected) => {}
            other => panic!("unexpected: {:?}", other.err()),
        }

        // 链路恢复后自动重连
        bus.fail_open(None);
        bus.clear_read_fault("M120");
        assert_eq!(session.read_device("M120").unwrap(), 1);
        assert!(session.is_connected());
    }

    #[test]
    fn test_write_failure_marks_disconnected() {
        let (session, bus) = session_with_bus();
        session.write_device("M310", 1).unwrap();
        assert_eq!(bus.point("M310"), 1);

        bus.fail_writes("M310", 0x2003);
        match session.write_device("M310", 0) {
            Err(PlcError::WriteFailed { device, value, code }) => {
                assert_eq!(device, "M310");
                assert_eq!(value, 0);
                assert_eq!(code, 0x2003);
            }
            other => panic!("unexpected: {:?}", other.err()),
        }
        assert!(!session.is_connected());
    }

    #[test]
    fn test_close_marks_disconnected() {
        let (session, _bus) = session_with_bus();
        assert!(session.ensure_connected());
        session.close();
        assert!(!session.is_connected());
    }
}

// ==========================================
// 装配产线 MES 服务 - 内存点位总线
// ==========================================
// 职责: 无厂商链路环境下的传输实现（测试/产线模拟/干跑）
// 语义: 未写入过的点位读出 0，与 PLC 位存储默认值一致
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::plc::session::PlcTransport;

// ==========================================
// MemoryBus - 可共享的点位存储句柄
// ==========================================

#[derive(Debug, Default)]
struct MemoryBusState {
    points: HashMap<String, i32>,
    open_fail_code: Option<i32>,
    read_faults: HashMap<String, i32>,
    write_faults: HashMap<String, i32>,
}

/// 内存点位总线
///
/// 克隆后指向同一份点位存储；测试侧持有一个克隆用于
/// 抬起信号/注入故障，会话侧持有传输实现。
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Mutex<MemoryBusState>>,
}

impl MemoryBus {
    /// 写入点位值（绕过会话，模拟设备侧变化）
    pub fn set_point(&self, device: &str, value: i32) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.points.insert(device.to_string(), value);
    }

    /// 抬起位点位（置 1）
    pub fn raise(&self, device: &str) {
        self.set_point(device, 1);
    }

    /// 读取点位值（绕过会话；未写入过的点位为 0）
    pub fn point(&self, device: &str) -> i32 {
        let state = self.inner.lock().expect("memory bus poisoned");
        state.points.get(device).copied().unwrap_or(0)
    }

    /// 设置/清除链路打开故障（Some(code) 注入，None 清除）
    pub fn fail_open(&self, code: Option<i32>) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.open_fail_code = code;
    }

    /// 注入指定点位的读故障
    pub fn fail_reads(&self, device: &str, code: i32) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.read_faults.insert(device.to_string(), code);
    }

    /// 清除指定点位的读故障
    pub fn clear_read_fault(&self, device: &str) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.read_faults.remove(device);
    }

    /// 注入指定点位的写故障
    pub fn fail_writes(&self, device: &str, code: i32) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.write_faults.insert(device.to_string(), code);
    }

    /// 清除指定点位的写故障
    pub fn clear_write_fault(&self, device: &str) {
        let mut state = self.inner.lock().expect("memory bus poisoned");
        state.write_faults.remove(device);
    }
}

// ==========================================
// MemoryTransport - 内存传输实现
// ==========================================

/// 链路未打开时返回的错误码
const LINK_CLOSED_CODE: i32 = -255;

/// 内存传输实现
pub struct MemoryTransport {
    bus: MemoryBus,
    opened: bool,
}

impl MemoryTransport {
    pub fn new(bus: MemoryBus) -> Self {
        Self { bus, opened: false }
    }
}

impl PlcTransport for MemoryTransport {
    fn open(&mut self) -> Result<(), i32> {
        let state = self.bus.inner.lock().expect("memory bus poisoned");
        if let Some(code) = state.open_fail_code {
            return Err(code);
        }
        drop(state);
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn get_device(&mut self, device: &str) -> Result<i32, i32> {
        if !self.opened {
            return Err(LINK_CLOSED_CODE);
        }
        let state = self.bus.inner.lock().expect("memory bus poisoned");
        if let Some(code) = state.read_faults.get(device) {
            return Err(*code);
        }
        Ok(state.points.get(device).copied().unwrap_or(0))
    }

    fn set_device(&mut self, device: &str, value: i32) -> Result<(), i32> {
        if !self.opened {
            return Err(LINK_CLOSED_CODE);
        }
        let mut state = self.bus.inner.lock().expect("memory bus poisoned");
        if let Some(code) = state.write_faults.get(device) {
            return Err(*code);
        }
        state.points.insert(device.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_point_reads_zero() {
        let bus = MemoryBus::default();
        let mut transport = MemoryTransport::new(bus);
        transport.open().unwrap();
        assert_eq!(transport.get_device("M999").unwrap(), 0);
    }

    #[test]
    fn test_bus_and_transport_share_points() {
        let bus = MemoryBus::default();
        let mut transport = MemoryTransport::new(bus.clone());
        transport.open().unwrap();

        bus.raise("M120");
        assert_eq!(transport.get_device("M120").unwrap(), 1);

        transport.set_device("M120", 0).unwrap();
        assert_eq!(bus.point("M120"), 0);
    }
}

//! 回环 TCP 上的模拟控制器
//!
//! 指令端口按请求逐条应答，状态端口每 20 ms 推送一帧遥测。
//! 末端位姿随 `moveL`/`end_move` 更新；工具中心点到达 `surface_z`
//! 以下时模拟输入 0 读数为 5.0，否则为 0.5。

#![allow(dead_code)]

use painter_sdk::protocol::FrameDecoder;
use serde_json::{Value, json};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct ArmState {
    pub pose: [f64; 6],
    pub surface_z: f64,
    pub fault_next: Option<(String, String)>,
    pub received: Vec<String>,
}

impl ArmState {
    fn sensor(&self) -> f64 {
        if self.pose[2] <= self.surface_z + 1e-9 {
            5.0
        } else {
            0.5
        }
    }
}

pub struct FakeController {
    pub command_port: u16,
    pub status_port: u16,
    pub arm: Arc<Mutex<ArmState>>,
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl FakeController {
    pub fn start(initial_pose: [f64; 6], surface_z: f64) -> Self {
        let command_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let status_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let command_port = command_listener.local_addr().unwrap().port();
        let status_port = status_listener.local_addr().unwrap().port();

        let arm = Arc::new(Mutex::new(ArmState {
            pose: initial_pose,
            surface_z,
            fault_next: None,
            received: Vec::new(),
        }));
        let running = Arc::new(AtomicBool::new(true));

        let command_thread = {
            let arm = arm.clone();
            let running = running.clone();
            thread::spawn(move || {
                if let Some(stream) = accept(&command_listener, &running) {
                    serve_commands(stream, &arm, &running);
                }
            })
        };
        let status_thread = {
            let arm = arm.clone();
            let running = running.clone();
            thread::spawn(move || {
                if let Some(stream) = accept(&status_listener, &running) {
                    push_telemetry(stream, &arm, &running);
                }
            })
        };

        Self {
            command_port,
            status_port,
            arm,
            running,
            threads: vec![command_thread, status_thread],
        }
    }

    /// 下一条指令以给定错误码应答
    pub fn fail_next(&self, code: &str, message: &str) {
        self.arm.lock().unwrap().fault_next = Some((code.to_string(), message.to_string()));
    }

    pub fn received(&self) -> Vec<String> {
        self.arm.lock().unwrap().received.clone()
    }

    pub fn pose(&self) -> [f64; 6] {
        self.arm.lock().unwrap().pose
    }
}

impl Drop for FakeController {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

fn accept(listener: &TcpListener, running: &AtomicBool) -> Option<TcpStream> {
    listener.set_nonblocking(true).unwrap();
    while running.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).unwrap();
                return Some(stream);
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(Duration::from_millis(5)),
            Err(_) => return None,
        }
    }
    None
}

fn serve_commands(mut stream: TcpStream, arm: &Mutex<ArmState>, running: &AtomicBool) {
    stream
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();
    let mut decoder = FrameDecoder::default();
    let mut buf = [0u8; 4096];

    while running.load(Ordering::Acquire) {
        if let Ok(Some(frame)) = decoder.next_frame() {
            let reply = handle(arm, &frame);
            if stream.write_all(reply.as_bytes()).is_err() {
                return;
            }
            continue;
        }
        match stream.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => decoder.push(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {},
            Err(_) => return,
        }
    }
}

fn handle(arm: &Mutex<ArmState>, frame: &str) -> String {
    let request: Value = serde_json::from_str(frame).unwrap();
    let name = request["cmdName"].as_str().unwrap_or_default().to_string();
    let mut arm = arm.lock().unwrap();
    arm.received.push(frame.to_string());

    if let Some((code, message)) = arm.fault_next.take() {
        return json!({"cmdName": name, "errorCode": code, "errorMsg": message}).to_string();
    }

    let mut reply = json!({"cmdName": name, "errorCode": "0", "errorMsg": ""});
    match name.as_str() {
        "moveL" | "end_move" => {
            let target: Vec<f64> = request["jointPosition"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_f64().unwrap())
                .collect();
            let relative = request["relFlag"].as_i64() == Some(1);
            for (axis, value) in target.iter().enumerate() {
                if relative {
                    arm.pose[axis] += value;
                } else {
                    arm.pose[axis] = *value;
                }
            }
        },
        "get_data" => {
            reply["actual_position"] = json!(arm.pose);
            reply["joint_actual_position"] = json!([0.0, 90.0, -90.0, 0.0, 90.0, 0.0]);
            reply["din"] = json!([0, 1]);
            reply["ain"] = json!([arm.sensor()]);
        },
        _ => {},
    }
    reply.to_string()
}

fn push_telemetry(mut stream: TcpStream, arm: &Mutex<ArmState>, running: &AtomicBool) {
    while running.load(Ordering::Acquire) {
        let frame = {
            let arm = arm.lock().unwrap();
            json!({
                "actual_position": arm.pose,
                "ain": [arm.sensor()],
                "drag_status": 0,
                "protective_stop": false,
            })
            .to_string()
        };
        if stream.write_all(frame.as_bytes()).is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

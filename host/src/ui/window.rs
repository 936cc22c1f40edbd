//! 指令窗口的开合状态

/// 每帧开合的速度
const OPEN_SPEED: u32 = 32;

/// 窗口开合
///
/// 只跟踪开合程度（0 - 255），不负责绘制。
/// 关闭过程中 [`WindowOpenness::is_closing`] 为真，场景据此推迟切换。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowOpenness {
    openness: u32,
    opening: bool,
    closing: bool,
    visible: bool,
}

impl WindowOpenness {
    /// 创建关闭的窗口
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Default::default()
        }
    }

    pub fn openness(&self) -> u32 {
        self.openness
    }

    pub fn is_open(&self) -> bool {
        self.openness >= 255
    }

    pub fn is_closed(&self) -> bool {
        self.openness == 0
    }

    pub fn is_opening(&self) -> bool {
        self.opening
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open(&mut self) {
        if !self.is_open() {
            self.opening = true;
        }
        self.closing = false;
    }

    pub fn close(&mut self) {
        if !self.is_closed() {
            self.closing = true;
        }
        self.opening = false;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// 推进一帧
    pub fn update(&mut self) {
        if self.opening {
            self.openness = (self.openness + OPEN_SPEED).min(255);
            if self.is_open() {
                self.opening = false;
            }
        }
        if self.closing {
            self.openness = self.openness.saturating_sub(OPEN_SPEED);
            if self.is_closed() {
                self.closing = false;
            }
        }
    }
}

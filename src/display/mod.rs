mod font;
mod pixel_buffer;

pub use font::{
    draw_char_scaled, draw_text, draw_text_scaled, get_glyph, text_width_scaled, GLYPH_HEIGHT,
    GLYPH_ROWS, GLYPH_WIDTH,
};
pub use pixel_buffer::{alpha_u8, PixelBuffer};

#[cfg(feature = "window")]
pub use window::{Display, InputEvent, MouseButtonKind, RenderTarget};

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

#[cfg(feature = "window")]
mod window {
    use super::PixelBuffer;
    use crate::error::FxError;
    use sdl2::event::{Event, WindowEvent};
    use sdl2::keyboard::Keycode;
    use sdl2::mouse::MouseButton;
    use sdl2::pixels::PixelFormatEnum;
    use sdl2::render::{Canvas, Texture, TextureCreator};
    use sdl2::video::{Window, WindowContext};
    use sdl2::EventPump;

    pub struct Display {
        canvas: Canvas<Window>,
        event_pump: EventPump,
    }

    pub struct RenderTarget<'a> {
        texture: Texture<'a>,
    }

    #[derive(Debug, Clone)]
    pub enum InputEvent {
        Quit,
        KeyDown(Keycode),
        MouseDown {
            x: i32,
            y: i32,
            button: MouseButtonKind,
        },
        /// Window was resized to (width, height)
        Resized(u32, u32),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MouseButtonKind {
        Left,
        Right,
        Middle,
    }

    impl Display {
        /// Create a resizable window with custom resolution and VSync settings
        pub fn with_options(
            title: &str,
            width: u32,
            height: u32,
            vsync: bool,
        ) -> Result<(Self, TextureCreator<WindowContext>), FxError> {
            let sdl_context = sdl2::init().map_err(FxError::Display)?;
            let video_subsystem = sdl_context.video().map_err(FxError::Display)?;

            let window = video_subsystem
                .window(title, width, height)
                .position_centered()
                .resizable()
                .build()
                .map_err(|e| FxError::Display(e.to_string()))?;

            let mut canvas_builder = window.into_canvas().accelerated();
            if vsync {
                canvas_builder = canvas_builder.present_vsync();
            }
            let canvas = canvas_builder
                .build()
                .map_err(|e| FxError::Display(e.to_string()))?;

            let texture_creator = canvas.texture_creator();
            let event_pump = sdl_context.event_pump().map_err(FxError::Display)?;

            Ok((Self { canvas, event_pump }, texture_creator))
        }

        pub fn present(
            &mut self,
            target: &mut RenderTarget,
            buffer: &PixelBuffer,
        ) -> Result<(), FxError> {
            target
                .texture
                .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
                .map_err(|e| FxError::Display(e.to_string()))?;

            self.canvas
                .copy(&target.texture, None, None)
                .map_err(FxError::Display)?;
            self.canvas.present();
            Ok(())
        }

        pub fn poll_events(&mut self) -> Vec<InputEvent> {
            let mut events = Vec::new();

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => events.push(InputEvent::Quit),
                    Event::KeyDown {
                        keycode: Some(k), ..
                    } => events.push(InputEvent::KeyDown(k)),
                    Event::MouseButtonDown {
                        x, y, mouse_btn, ..
                    } => {
                        if let Some(button) = map_mouse_button(mouse_btn) {
                            events.push(InputEvent::MouseDown { x, y, button });
                        }
                    },
                    Event::Window {
                        win_event: WindowEvent::SizeChanged(w, h),
                        ..
                    } if w > 0 && h > 0 => events.push(InputEvent::Resized(w as u32, h as u32)),
                    _ => {},
                }
            }

            events
        }
    }

    impl<'a> RenderTarget<'a> {
        pub fn with_size(
            texture_creator: &'a TextureCreator<WindowContext>,
            width: u32,
            height: u32,
        ) -> Result<Self, FxError> {
            let texture = texture_creator
                .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
                .map_err(|e| FxError::Display(e.to_string()))?;
            Ok(Self { texture })
        }
    }

    fn map_mouse_button(btn: MouseButton) -> Option<MouseButtonKind> {
        match btn {
            MouseButton::Left => Some(MouseButtonKind::Left),
            MouseButton::Right => Some(MouseButtonKind::Right),
            MouseButton::Middle => Some(MouseButtonKind::Middle),
            _ => None,
        }
    }
}

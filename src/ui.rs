// UI module for the emotion detection window

use crate::controls::CLOSE_BUTTON_LABEL;
use crate::video_loop::{Canvas, VideoLoop};
use image::RgbImage;
use std::time::Instant;
use tracing::error;

/// Canvas backed by an egui texture. The handle keeps the texture alive while displayed.
struct TextureCanvas<'a> {
    ctx: &'a egui::Context,
    texture: &'a mut Option<egui::TextureHandle>,
}

impl Canvas for TextureCanvas<'_> {
    fn present(&mut self, image: RgbImage) {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, image.as_raw());

        if let Some(texture) = self.texture.as_mut() {
            texture.set(color_image, egui::TextureOptions::LINEAR);
            return;
        }
        *self.texture = Some(
            self.ctx
                .load_texture("camera", color_image, egui::TextureOptions::LINEAR),
        );
    }
}

/// Main window: the camera canvas plus the close and emotion buttons
pub struct EmotionDetectionApp {
    video: VideoLoop,
    camera_texture: Option<egui::TextureHandle>,
}

impl EmotionDetectionApp {
    pub fn new(video: VideoLoop) -> Self {
        Self {
            video,
            camera_texture: None,
        }
    }

    /// Runs the loop's tick if it is due and schedules the next repaint
    fn drive_loop(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let mut canvas = TextureCanvas {
            ctx,
            texture: &mut self.camera_texture,
        };

        if let Some(Err(e)) = self.video.poll(now, &mut canvas) {
            error!("Frame processing failed: {}", e);
        }

        if let Some(wait) = self.video.time_until_next_tick(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }

    /// Renders the control buttons below the canvas
    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.add_space(10.0);
                if ui.button(CLOSE_BUTTON_LABEL).clicked() {
                    self.video.close_camera();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(10.0);
                    if ui.button(self.video.emotion_button_label()).clicked() {
                        self.video.click_emotion_button();
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    /// Renders the camera canvas at the camera's native size
    fn render_canvas(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(texture) = &self.camera_texture {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(texture.size_vec2()));
                }
            });
    }
}

impl eframe::App for EmotionDetectionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_loop(ctx);

        self.render_controls(ctx);
        self.render_canvas(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.video.close_camera();
    }
}

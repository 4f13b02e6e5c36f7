//! The motion compiler: ordered strokes in, typed g-code out.
//!
//! Document space is y-down with the origin at the top-left; machine space
//! is y-up with the origin at the front-left corner of the bed, so every Y
//! flips through `bed_depth - y`. The extruder axis is absolute (`M82`) and
//! the E value accumulates across the whole print.

use crate::commands::GcodeCommand;
use crate::order::{order_strokes, OrientedStroke};
use pathprint_core::{round_nm, Point2D, Stroke};
use pathprint_settings::{JobOptions, PrintConfig};
use std::f64::consts::PI;
use tracing::debug;

/// Feed used for the priming travel and the initial Z hop, mm/min.
const SETUP_FEED: f64 = 15_000.0;

pub struct ToolpathCompiler<'a> {
    config: &'a PrintConfig,
    job: &'a JobOptions,
}

struct MotionState {
    x: f64,
    y: f64,
    e: f64,
    /// Last feed written by a motion command, mm/min. Retraction moves
    /// carry their own feed without claiming this.
    feed: f64,
    retracted: bool,
}

impl<'a> ToolpathCompiler<'a> {
    pub fn new(config: &'a PrintConfig, job: &'a JobOptions) -> Self {
        Self { config, job }
    }

    /// Compiles strokes into a complete typed g-code program: preamble,
    /// the layer stack, and the cooldown postamble.
    pub fn compile(&self, strokes: &[Stroke]) -> Vec<GcodeCommand> {
        let mut strokes: Vec<Stroke> = strokes.to_vec();
        let default_width = self.config.process.default_line_width;
        for stroke in &mut strokes {
            if stroke.line_width <= 0.0 {
                stroke.line_width = default_width;
            }
        }
        if self.job.center_on_bed {
            center_strokes(
                &mut strokes,
                self.config.machine.bed_width,
                self.config.machine.bed_depth,
            );
        }
        let order = order_strokes(&strokes, Point2D::new(0.0, 0.0));
        let heights = self.layer_heights();
        debug!(
            strokes = strokes.len(),
            layers = heights.len(),
            "compiling toolpath"
        );

        let mut commands = Vec::new();
        self.preamble(&mut commands);

        let mut state = MotionState {
            x: 0.0,
            y: 0.0,
            e: 0.0,
            feed: 0.0,
            retracted: self.config.retraction.enabled,
        };

        for (layer_nr, &z) in heights.iter().enumerate() {
            commands.push(GcodeCommand::Comment(format!("LAYER:{layer_nr}")));
            commands.push(GcodeCommand::Travel {
                x: None,
                y: None,
                z: Some(z),
                feed: (layer_nr == 0).then_some(SETUP_FEED),
            });
            if layer_nr == 1 {
                // The first layer printed at the initial-layer temperatures;
                // settle to the steady-state ones now, without waiting.
                commands.push(GcodeCommand::HeatHotend {
                    celsius: self.config.material.print_temperature,
                    wait: false,
                });
                commands.push(GcodeCommand::HeatBed {
                    celsius: self.config.material.bed_temperature,
                    wait: false,
                });
            }

            let thickness = if layer_nr == 0 {
                self.config.process.initial_layer_height
            } else {
                self.config.process.layer_height
            };
            for oriented in &order {
                self.print_stroke(&mut commands, &mut state, &strokes, oriented, layer_nr, thickness);
            }
        }

        self.postamble(&mut commands, &state);
        commands
    }

    /// Heights of every layer, bottom-up. The count follows the requested
    /// object height but never drops below one layer: a zero height is taken
    /// as "just print it once".
    fn layer_heights(&self) -> Vec<f64> {
        let h0 = self.config.process.initial_layer_height;
        let h = self.config.process.layer_height;
        let above = ((self.job.target_height - h0) / h).round().max(0.0) as usize;
        (0..=above).map(|i| round_nm(h0 + i as f64 * h)).collect()
    }

    fn preamble(&self, commands: &mut Vec<GcodeCommand>) {
        commands.push(GcodeCommand::SelectTool(0));
        commands.push(GcodeCommand::AbsoluteExtrusion);
        commands.push(GcodeCommand::ResetExtruder);
        commands.push(GcodeCommand::HeatHotend {
            celsius: self.config.material.print_temperature_layer_0,
            wait: true,
        });
        commands.push(GcodeCommand::HeatBed {
            celsius: self.config.material.bed_temperature_layer_0,
            wait: true,
        });
        if self.config.machine.prime_blob {
            commands.push(GcodeCommand::Travel {
                x: Some(self.config.machine.prime_x),
                y: Some(self.config.machine.prime_y),
                z: Some(2.0),
                feed: Some(SETUP_FEED),
            });
            commands.push(GcodeCommand::PrimeBlob);
        }
        if self.config.retraction.enabled {
            // Start the print retracted; the first stroke unretracts.
            commands.push(GcodeCommand::MoveExtruder {
                feed: self.config.retraction.retract_speed * 60.0,
                e: -self.config.retraction.distance,
            });
        }
        commands.push(GcodeCommand::FanOff);
        commands.push(GcodeCommand::SetAcceleration {
            accel: self.config.process.acceleration,
        });
        commands.push(GcodeCommand::SetJerk {
            jerk: self.config.process.jerk,
        });
    }

    fn postamble(&self, commands: &mut Vec<GcodeCommand>, state: &MotionState) {
        if self.config.retraction.enabled && !state.retracted {
            commands.push(GcodeCommand::MoveExtruder {
                feed: self.config.retraction.retract_speed * 60.0,
                e: state.e - self.config.retraction.distance,
            });
        }
        commands.push(GcodeCommand::HeatBed {
            celsius: 0.0,
            wait: false,
        });
        commands.push(GcodeCommand::HeatHotend {
            celsius: 0.0,
            wait: false,
        });
        commands.push(GcodeCommand::FanOff);
    }

    fn print_stroke(
        &self,
        commands: &mut Vec<GcodeCommand>,
        state: &mut MotionState,
        strokes: &[Stroke],
        oriented: &OrientedStroke,
        layer_nr: usize,
        thickness: f64,
    ) {
        let stroke = &strokes[oriented.index];
        let points: Vec<Point2D> = if oriented.reversed {
            stroke.points.iter().rev().copied().collect()
        } else {
            stroke.points.clone()
        };

        self.travel_to(commands, state, points[0], layer_nr);
        for &point in &points[1..] {
            self.extrude_to(commands, state, point, stroke.line_width, layer_nr, thickness);
        }
    }

    /// Machine coordinates of a document-space point: Y flips because the
    /// bed's Y axis grows towards the back.
    fn to_machine(&self, p: Point2D) -> (f64, f64) {
        (round_nm(p.x), round_nm(self.config.machine.bed_depth - p.y))
    }

    fn travel_to(
        &self,
        commands: &mut Vec<GcodeCommand>,
        state: &mut MotionState,
        target: Point2D,
        layer_nr: usize,
    ) {
        let (tx, ty) = self.to_machine(target);
        if tx == state.x && ty == state.y {
            // A stationary travel has no effect; dropping it also drops the
            // retract/unretract pair that would have bracketed it.
            return;
        }
        if !state.retracted && self.config.retraction.enabled {
            commands.push(GcodeCommand::MoveExtruder {
                feed: self.config.retraction.retract_speed * 60.0,
                e: state.e - self.config.retraction.distance,
            });
            state.retracted = true;
        }

        let speed = if layer_nr == 0 {
            self.config.process.travel_speed_layer_0
        } else {
            self.config.process.travel_speed
        };
        let feed = speed * 60.0;
        commands.push(GcodeCommand::Travel {
            x: (tx != state.x).then_some(tx),
            y: (ty != state.y).then_some(ty),
            z: None,
            feed: (feed != state.feed).then_some(feed),
        });
        state.x = tx;
        state.y = ty;
        state.feed = feed;
    }

    fn extrude_to(
        &self,
        commands: &mut Vec<GcodeCommand>,
        state: &mut MotionState,
        target: Point2D,
        line_width: f64,
        layer_nr: usize,
        thickness: f64,
    ) {
        let (tx, ty) = self.to_machine(target);
        let distance = (tx - state.x).hypot(ty - state.y);
        if distance == 0.0 {
            return;
        }
        if state.retracted {
            commands.push(GcodeCommand::MoveExtruder {
                feed: self.config.retraction.prime_speed * 60.0,
                e: state.e,
            });
            state.retracted = false;
        }

        let flow = if layer_nr == 0 {
            self.config.material.flow_layer_0
        } else {
            self.config.material.flow
        };
        let volume = distance * thickness * line_width * flow;
        let filament_area = PI * self.config.material.diameter * self.config.material.diameter / 4.0;
        state.e += volume / filament_area;

        let speed = if layer_nr == 0 {
            self.config.process.print_speed_layer_0
        } else {
            self.config.process.print_speed
        };
        let feed = speed * 60.0;
        commands.push(GcodeCommand::Extrude {
            x: (tx != state.x).then_some(tx),
            y: (ty != state.y).then_some(ty),
            feed: (feed != state.feed).then_some(feed),
            e: state.e,
        });
        state.x = tx;
        state.y = ty;
        state.feed = feed;
    }
}

/// Shifts all strokes so their shared bounding box is centred on the bed.
fn center_strokes(strokes: &mut [Stroke], bed_width: f64, bed_depth: f64) {
    let mut min = Point2D::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for stroke in strokes.iter() {
        for p in &stroke.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
    }
    if !min.x.is_finite() {
        return;
    }
    let dx = (bed_width - (min.x + max.x)) / 2.0;
    let dy = (bed_depth - (min.y + max.y)) / 2.0;
    for stroke in strokes.iter_mut() {
        for p in &mut stroke.points {
            *p = Point2D::new(round_nm(p.x + dx), round_nm(p.y + dy));
        }
    }
}

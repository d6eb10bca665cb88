// Orchestrates one timestep: advect -> diffuse -> project

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    ScalarField, VelocityField,
    sim::{
        advection,
        boundary::ChannelBoundary,
        diffusion, numeric,
        error::SimError,
        grid::Grid,
        poisson::{self, ProjectionReport},
    },
};

/// Number of Jacobi sweeps per projection unless configured otherwise
pub const DEFAULT_PRESSURE_ITERATIONS: usize = 100;

/// Physical and numerical parameters of a simulation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// The (uniform) grid spacing
    pub dx: f32,

    /// The requested timestep; the step actually taken may be smaller
    pub dt: f32,

    /// The kinematic viscosity
    pub viscosity: f32,

    /// Inflow speed through the left edge
    pub inflow: f32,

    /// Jacobi sweeps per projection
    #[serde(default = "default_pressure_iterations")]
    pub pressure_iterations: usize,

    /// Whether to cap dt at the explicit-diffusion stability bound
    #[serde(default = "default_stability_clamp")]
    pub stability_clamp: bool,

    /// Dye concentration injected at the inlet; no dye is transported when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dye_inflow: Option<f32>,
}

fn default_pressure_iterations() -> usize {
    DEFAULT_PRESSURE_ITERATIONS
}

fn default_stability_clamp() -> bool {
    true
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            dx: 1.,
            dt: 0.1,
            viscosity: 0.02,
            inflow: 1.,
            pressure_iterations: DEFAULT_PRESSURE_ITERATIONS,
            stability_clamp: true,
            dye_inflow: None,
        }
    }
}

impl SolverConfig {
    fn validate(&self) -> Result<(), SimError> {
        if !(self.dx > 0.) {
            return Err(SimError::InvalidConfig(format!(
                "dx must be positive, got {}",
                self.dx
            )));
        }
        if !(self.dt > 0.) {
            return Err(SimError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(self.viscosity >= 0.) {
            return Err(SimError::InvalidConfig(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }
        Ok(())
    }
}

/// Incompressible channel-flow solver on a fixed `nx` x `ny` grid.
///
/// Owns every field exclusively; callers only ever see copies or shared
/// references, so nothing outside `step`/`set_obstacle` can mutate state.
pub struct Simulator {
    config: SolverConfig,

    /// Inlet/outlet conditions derived from `config.inflow`
    bc: ChannelBoundary,

    /// The number of columns in the space domain
    nx: usize,

    /// The number of rows in the space domain
    ny: usize,

    /// The velocity field
    u: VelocityField,

    /// The pressure field; kept between steps as the Jacobi warm start
    p: ScalarField,

    /// Passive dye concentration
    dye: ScalarField,

    /// The mask representing the solid object
    obstacle: Grid<bool>,

    /// The timestep used by the most recent (or next) step
    effective_dt: f32,

    /// Viscosity for which a clamp has already been reported
    clamp_reported: Option<f32>,

    /// Iteration-counter
    steps: usize,

    /// Simulated time
    elapsed: f32,

    last_projection: Option<ProjectionReport>,
}

impl Simulator {
    /// Create a new simulator with every field zeroed and no obstacle
    ///
    /// Parameters
    /// - `nx` - The number of columns
    /// - `ny` - The number of rows
    /// - `config` - The solver parameters
    pub fn new(nx: usize, ny: usize, config: SolverConfig) -> Result<Self, SimError> {
        if nx == 0 || ny == 0 {
            return Err(SimError::InvalidConfig(format!(
                "grid must be non-empty, got {nx}x{ny}"
            )));
        }
        config.validate()?;

        let zeros: ScalarField = Grid::from_element(nx, ny, 0.);

        Ok(Simulator {
            bc: ChannelBoundary::new(config.inflow),
            effective_dt: config.dt,
            config,
            nx,
            ny,
            u: [zeros.clone(), zeros.clone()],
            p: zeros.clone(),
            dye: zeros,
            obstacle: Grid::from_element(nx, ny, false),
            clamp_reported: None,
            steps: 0,
            elapsed: 0.,
            last_projection: None,
        })
    }

    /// Replace the obstacle mask. The mask is row-major and must hold exactly
    /// `nx * ny` cells; otherwise nothing changes and an error is returned.
    ///
    /// Velocity, pressure and dye are zeroed at every solid cell.
    pub fn set_obstacle(&mut self, mask: &[bool]) -> Result<(), SimError> {
        if mask.len() != self.obstacle.len() {
            let err = SimError::MaskSize {
                expected: self.obstacle.len(),
                actual: mask.len(),
            };
            warn!("Ignoring obstacle mask: {err}");
            return Err(err);
        }

        self.obstacle.as_mut_slice().copy_from_slice(mask);

        let [ux, uy] = &mut self.u;
        numeric::zero_where_mask(ux, &self.obstacle);
        numeric::zero_where_mask(uy, &self.obstacle);
        numeric::zero_where_mask(&mut self.p, &self.obstacle);
        numeric::zero_where_mask(&mut self.dye, &self.obstacle);

        debug!(
            "Obstacle set: {} solid cells",
            self.obstacle.iter().filter(|m| **m).count()
        );

        Ok(())
    }

    /// Like `set_obstacle`, but also checks that the grid's (nx, ny) matches
    pub fn set_obstacle_grid(&mut self, mask: &Grid<bool>) -> Result<(), SimError> {
        if mask.shape() != (self.nx, self.ny) {
            let err = SimError::MaskShape {
                expected: (self.nx, self.ny),
                actual: mask.shape(),
            };
            warn!("Ignoring obstacle mask: {err}");
            return Err(err);
        }
        self.set_obstacle(mask.as_slice())
    }

    /// Change the viscosity. The effective timestep is recomputed from the
    /// requested one on the next step.
    pub fn set_viscosity(&mut self, viscosity: f32) -> Result<(), SimError> {
        let config = SolverConfig {
            viscosity,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Compute the timestep for the next step, capped at dx²/(4ν) when the
    /// clamp is enabled and ν > 0.
    fn update_effective_dt(&mut self) -> f32 {
        let requested = self.config.dt;
        let bound = if self.config.stability_clamp {
            diffusion::stable_dt(self.config.dx, self.config.viscosity)
        } else {
            None
        };

        self.effective_dt = match bound {
            Some(max_dt) if requested > max_dt => {
                if self.clamp_reported != Some(self.config.viscosity) {
                    warn!(
                        "dt {} exceeds the diffusion stability bound; using {}",
                        requested, max_dt
                    );
                    self.clamp_reported = Some(self.config.viscosity);
                }
                max_dt
            }
            _ => requested,
        };

        self.effective_dt
    }

    /// Advance the simulation by one (possibly clamped) timestep
    ///
    /// Returns
    /// - The divergence report of this step's projection
    pub fn step(&mut self) -> ProjectionReport {
        let dt = self.update_effective_dt();
        let (dx, viscosity) = (self.config.dx, self.config.viscosity);

        // both components are advected against the pre-step velocity
        let [u0, v0] = self.u.clone();

        let ux = advection::advect(&u0, &u0, &v0, &self.obstacle, dt, dx);
        let uy = advection::advect(&v0, &u0, &v0, &self.obstacle, dt, dx);

        let [ux_out, uy_out] = &mut self.u;
        ux_out.assign(&diffusion::diffuse(&ux, viscosity, dt, dx));
        uy_out.assign(&diffusion::diffuse(&uy, viscosity, dt, dx));

        let report = poisson::project(
            ux_out,
            uy_out,
            &mut self.p,
            &self.obstacle,
            &self.bc,
            dx,
            self.config.pressure_iterations,
        );

        if let Some(inlet) = self.config.dye_inflow {
            let mut dye = advection::advect(&self.dye, &u0, &v0, &self.obstacle, dt, dx);
            self.bc.apply_scalar(&mut dye, inlet);
            numeric::zero_where_mask(&mut dye, &self.obstacle);
            self.dye.assign(&dye);
        }

        self.steps += 1;
        self.elapsed += dt;
        self.last_projection = Some(report);

        report
    }

    pub fn width(&self) -> usize {
        self.nx
    }

    pub fn height(&self) -> usize {
        self.ny
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Copies of the (u, v) velocity components
    pub fn velocity(&self) -> (ScalarField, ScalarField) {
        (self.u[0].clone(), self.u[1].clone())
    }

    pub fn pressure(&self) -> &ScalarField {
        &self.p
    }

    pub fn obstacle(&self) -> &Grid<bool> {
        &self.obstacle
    }

    pub fn dye(&self) -> &ScalarField {
        &self.dye
    }

    /// sqrt(u² + v²) at `(row, col)`, or 0 for any coordinate outside the grid
    pub fn velocity_magnitude(&self, row: isize, col: isize) -> f32 {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return 0.;
        };

        match (self.u[0].get(row, col), self.u[1].get(row, col)) {
            (Some(ux), Some(uy)) => ux.hypot(*uy),
            _ => 0.,
        }
    }

    /// Largest velocity magnitude over the whole domain (full scan)
    pub fn max_velocity_magnitude(&self) -> f32 {
        self.u[0]
            .iter()
            .zip(self.u[1].iter())
            .fold(0.0f32, |m, (ux, uy)| m.max(ux.hypot(*uy)))
    }

    /// Divergence of the current velocity field
    pub fn divergence(&self) -> ScalarField {
        numeric::divergence(&self.u[0], &self.u[1], self.config.dx)
    }

    /// The timestep requested by the caller; never modified
    pub fn requested_dt(&self) -> f32 {
        self.config.dt
    }

    /// The timestep used by the most recent step
    pub fn effective_dt(&self) -> f32 {
        self.effective_dt
    }

    pub fn is_dt_clamped(&self) -> bool {
        self.effective_dt < self.config.dt
    }

    pub fn last_projection(&self) -> Option<ProjectionReport> {
        self.last_projection
    }

    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// Total simulated time
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

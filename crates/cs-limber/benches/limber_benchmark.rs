use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use cs_core::{Cosmology, RadialBin, RedshiftGrid};
use cs_cosmo::{ConstantPowerSpectrum, FlatLcdm};
use cs_limber::kernel::lensing_efficiency;
use cs_limber::{GwGalaxyParams, Power, gw_galaxy_tracers};

fn cosmology() -> Arc<dyn Cosmology> {
    Arc::new(FlatLcdm::planck18(1.5, Arc::new(ConstantPowerSpectrum::new(1.0).unwrap())).unwrap())
}

fn bench_lensing_efficiency(c: &mut Criterion) {
    let cosmo = cosmology();
    for n in [200usize, 1000] {
        let z = RedshiftGrid::linspace(0.001, 1.2, n).unwrap();
        let profile = nalgebra::DVector::from_element(n, 1.0 / 1.199);
        c.bench_function(&format!("lensing_efficiency_{n}"), |b| {
            b.iter(|| black_box(lensing_efficiency(&z, &profile, cosmo.as_ref()).unwrap()))
        });
    }
}

fn bench_gw_galaxy_cls(c: &mut Criterion) {
    let cosmo = cosmology();
    let power = Power::new(Arc::clone(&cosmo)).unwrap();
    let (gw, galaxy) = gw_galaxy_tracers(cosmo, &GwGalaxyParams::default()).unwrap();
    let z = RedshiftGrid::linspace(0.001, 1.2, 400).unwrap();
    let bins = RadialBin::equal_width(0.001, 1.2, 6).unwrap();

    c.bench_function("gw_galaxy_cls_400", |b| {
        b.iter(|| black_box(power.cls(100, &bins[1], &bins[3], &gw, &galaxy, &z).unwrap()))
    });
}

criterion_group!(benches, bench_lensing_efficiency, bench_gw_galaxy_cls);
criterion_main!(benches);

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use proptest::prelude::*;

use crate::integrals::integrals_fixtures::{
    givens, h2_eri, h2_hcore, h2_molecule, model_coeff_alpha, restricted_model,
    unrestricted_model,
};
use crate::integrals::DipoleAxis;
use crate::transformers::active_space::{
    ActiveSpaceMode, ActiveSpaceParams, ActiveSpaceTransformer,
};
use crate::transformers::{ActiveSpaceError, ConfigurationError, OrbitalReducer};

const SHIFT_KEY: &str = "ActiveSpaceTransformer";

fn explicit_params(num_electrons: usize, num_orbitals: usize) -> ActiveSpaceParams {
    ActiveSpaceParams::builder()
        .num_electrons(num_electrons)
        .num_molecular_orbitals(num_orbitals)
        .build()
        .unwrap()
}

// ----------
// Parameters
// ----------

#[test]
fn test_active_space_params_mode_resolution() {
    assert_eq!(
        explicit_params(2, 2).mode().unwrap(),
        ActiveSpaceMode::Explicit {
            num_electrons: 2,
            num_orbitals: 2,
            num_alpha: None,
            active_orbitals: None
        }
    );

    let freeze_core = ActiveSpaceParams::builder()
        .freeze_core(true)
        .remove_orbitals(vec![4])
        .build()
        .unwrap();
    assert_eq!(
        freeze_core.mode().unwrap(),
        ActiveSpaceMode::FreezeCore {
            remove_orbitals: vec![4]
        }
    );

    let nothing = ActiveSpaceParams::default();
    assert!(nothing.mode().is_err());

    let contradictory = ActiveSpaceParams::builder()
        .freeze_core(true)
        .num_electrons(2)
        .num_molecular_orbitals(2)
        .build()
        .unwrap();
    assert!(contradictory.mode().is_err());

    let underspecified = ActiveSpaceParams::builder()
        .num_electrons(2)
        .build()
        .unwrap();
    assert!(underspecified.mode().is_err());

    let stray_removal = ActiveSpaceParams::builder()
        .num_electrons(2)
        .num_molecular_orbitals(2)
        .remove_orbitals(vec![0])
        .build()
        .unwrap();
    assert!(stray_removal.mode().is_err());
}

#[test]
fn test_active_space_params_yaml() {
    let params: ActiveSpaceParams = serde_yaml::from_str(
        "
num_electrons: 2
num_molecular_orbitals: 2
active_orbitals: [1, 2]
",
    )
    .unwrap();
    assert_eq!(params.num_electrons, Some(2));
    assert_eq!(params.active_orbitals, Some(vec![1, 2]));
    assert!(!params.freeze_core);
    assert!(params.remove_orbitals.is_empty());
    assert_abs_diff_eq!(params.occupation_threshold, 1e-8);
    assert!(params.to_string().contains("Explicit active orbitals: [1, 2]"));
}

// --------------
// Golden values
// --------------

#[test]
fn test_active_space_h2_full_space_is_identity() {
    let mol = h2_molecule();
    let reduced = ActiveSpaceTransformer::new(explicit_params(2, 2))
        .transform(&mol)
        .unwrap();

    assert_eq!(reduced.num_orbitals(), 2);
    assert_eq!(reduced.num_alpha(), 1);
    assert_eq!(reduced.num_beta(), 1);
    assert_abs_diff_eq!(reduced.energy_shift()[SHIFT_KEY], 0.0);
    assert_abs_diff_eq!(reduced.nuclear_repulsion_energy(), 0.71996899);
    assert_abs_diff_eq!(reduced.hcore()[0], h2_hcore(), epsilon = 1e-12);
    assert_abs_diff_eq!(reduced.mo_onee_ints()[0], h2_hcore(), epsilon = 1e-12);
    assert_abs_diff_eq!(reduced.mo_eri_ints().unwrap()[0], h2_eri(), epsilon = 1e-12);
    for axis in DipoleAxis::all() {
        let original = mol.dipole(axis).unwrap();
        let dipole = reduced.dipole(axis).unwrap();
        assert_abs_diff_eq!(dipole.energy_shift()[SHIFT_KEY], 0.0);
        assert_abs_diff_eq!(
            &dipole.mo_ints().unwrap()[0],
            original.ao_ints(),
            epsilon = 1e-12
        );
    }
    assert_eq!(reduced.mo_occ().unwrap()[0], array![2.0, 0.0]);
}

#[test]
fn test_active_space_restricted_reference() {
    let mol = restricted_model(model_coeff_alpha(), vec![0, 1]);
    let transformer = ActiveSpaceTransformer::new(explicit_params(2, 2));

    let partition = transformer.partition(&mol).unwrap();
    assert_eq!(partition.active(), &vec![1, 2]);
    assert_eq!(partition.inactive(), &vec![0]);
    assert_eq!(partition.num_inactive_electrons(), 2);

    let reduced = transformer.transform(&mol).unwrap();
    assert_eq!(reduced.num_orbitals(), 2);
    assert_eq!(reduced.num_basis_functions(), 3);
    assert_eq!((reduced.num_alpha(), reduced.num_beta()), (1, 1));
    assert_eq!(reduced.core_orbitals(), &vec![0]);
    assert_abs_diff_eq!(
        reduced.energy_shift()[SHIFT_KEY],
        -1.7523944341272715,
        epsilon = 1e-10
    );

    let h1 = &reduced.mo_onee_ints()[0];
    assert_abs_diff_eq!(
        h1,
        &array![
            [0.19884787778558416, 0.7522653463167117],
            [0.7522653463167117, 0.6567257799573393]
        ],
        epsilon = 1e-10
    );

    let g = &reduced.mo_eri_ints().unwrap()[0];
    assert_abs_diff_eq!(g[(0, 0, 0, 0)], 0.7192311155139571, epsilon = 1e-10);
    assert_abs_diff_eq!(g[(0, 0, 1, 1)], 0.7851987443916989, epsilon = 1e-10);
    assert_abs_diff_eq!(g[(0, 1, 0, 1)], 0.46954412153961184, epsilon = 1e-10);
    assert_abs_diff_eq!(g[(1, 1, 1, 1)], 0.8803092686398954, epsilon = 1e-10);

    let dipole_z = reduced.dipole(DipoleAxis::Z).unwrap();
    assert_abs_diff_eq!(
        dipole_z.energy_shift()[SHIFT_KEY],
        0.5566765721329539,
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        &dipole_z.mo_ints().unwrap()[0],
        &array![
            [0.38843041254934874, -0.1821499602355839],
            [-0.18214996023558389, -0.5667686986158255]
        ],
        epsilon = 1e-10
    );
}

#[test]
fn test_active_space_unrestricted_reference() {
    let mol = unrestricted_model();
    let params = ActiveSpaceParams::builder()
        .num_electrons(1)
        .num_molecular_orbitals(2)
        .num_alpha(1)
        .build()
        .unwrap();
    let reduced = ActiveSpaceTransformer::new(params).transform(&mol).unwrap();

    assert_eq!((reduced.num_alpha(), reduced.num_beta()), (1, 0));
    assert_eq!(reduced.multiplicity(), 2);
    assert_abs_diff_eq!(
        reduced.energy_shift()[SHIFT_KEY],
        -2.244977498698264,
        epsilon = 1e-10
    );

    let h1 = reduced.mo_onee_ints();
    assert_eq!(h1.len(), 2);
    assert_abs_diff_eq!(
        h1[0],
        array![
            [-0.10309670379606392, 0.5266839578055778],
            [0.5266839578055779, 0.34018187618072626]
        ],
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        h1[1],
        array![
            [0.5268067974430581, 0.8015177497087564],
            [0.8015177497087564, 0.7784185354470223]
        ],
        epsilon = 1e-10
    );

    let g = reduced.mo_eri_ints().unwrap();
    assert_eq!(g.len(), 3);
    assert_abs_diff_eq!(g[0][(0, 0, 0, 0)], 0.7192311155139571, epsilon = 1e-10);
    assert_abs_diff_eq!(g[1][(0, 0, 1, 1)], 0.9732719795637079, epsilon = 1e-10);
    assert_abs_diff_eq!(g[1][(1, 1, 0, 0)], 0.8955498268539317, epsilon = 1e-10);
    assert_abs_diff_eq!(g[2][(1, 1, 1, 1)], 1.158069480798809, epsilon = 1e-10);

    let dipole_z = reduced.dipole(DipoleAxis::Z).unwrap();
    assert_abs_diff_eq!(
        dipole_z.energy_shift()[SHIFT_KEY],
        0.768743849935084,
        epsilon = 1e-10
    );
    assert_eq!(dipole_z.mo_ints().unwrap().len(), 2);

    let occ = reduced.mo_occ().unwrap();
    assert_eq!(occ[0], array![1.0, 0.0]);
    assert_eq!(occ[1], array![0.0, 0.0]);
}

#[test]
fn test_active_space_explicit_orbitals_match_default_block() {
    let mol = restricted_model(model_coeff_alpha(), vec![]);
    let default_block = ActiveSpaceTransformer::new(explicit_params(2, 2))
        .transform(&mol)
        .unwrap();
    let mut params = explicit_params(2, 2);
    params.active_orbitals = Some(vec![1, 2]);
    let explicit = ActiveSpaceTransformer::new(params).transform(&mol).unwrap();
    assert_abs_diff_eq!(
        explicit.energy_shift()[SHIFT_KEY],
        default_block.energy_shift()[SHIFT_KEY],
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        explicit.mo_onee_ints()[0],
        default_block.mo_onee_ints()[0],
        epsilon = 1e-12
    );
}

#[test]
fn test_active_space_num_alpha_ignored_for_restricted() {
    let mol = restricted_model(model_coeff_alpha(), vec![]);
    let mut params = explicit_params(2, 2);
    params.num_alpha = Some(2);
    let reduced = ActiveSpaceTransformer::new(params).transform(&mol).unwrap();
    assert_eq!((reduced.num_alpha(), reduced.num_beta()), (1, 1));
    assert_abs_diff_eq!(
        reduced.energy_shift()[SHIFT_KEY],
        -1.7523944341272715,
        epsilon = 1e-10
    );
}

#[test]
fn test_active_space_freeze_core_mode() {
    let mol = restricted_model(model_coeff_alpha(), vec![0]);
    let params = ActiveSpaceParams::builder()
        .freeze_core(true)
        .build()
        .unwrap();
    let transformer = ActiveSpaceTransformer::new(params);
    let partition = transformer.partition(&mol).unwrap();
    assert_eq!(partition.active(), &vec![1, 2]);
    assert_eq!((partition.num_alpha(), partition.num_beta()), (1, 1));

    let reduced = transformer.transform(&mol).unwrap();
    assert!(reduced.core_orbitals().is_empty());
    assert_abs_diff_eq!(
        reduced.energy_shift()[SHIFT_KEY],
        -1.7523944341272715,
        epsilon = 1e-10
    );
}

#[test]
fn test_active_space_chained_reductions_match_direct() {
    let mol = restricted_model(model_coeff_alpha(), vec![]);
    let direct = ActiveSpaceTransformer::new(explicit_params(0, 1))
        .transform(&mol)
        .unwrap();

    let first = ActiveSpaceTransformer::new(explicit_params(2, 2))
        .transform(&mol)
        .unwrap();
    let second = ActiveSpaceTransformer::new(explicit_params(0, 1))
        .transform(&first)
        .unwrap();

    assert_eq!(second.num_orbitals(), 1);
    assert_eq!(second.num_electrons(), 0);
    assert_abs_diff_eq!(
        second.energy_shift()[SHIFT_KEY],
        direct.energy_shift()[SHIFT_KEY],
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        second.mo_onee_ints()[0],
        direct.mo_onee_ints()[0],
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        second.mo_eri_ints().unwrap()[0],
        direct.mo_eri_ints().unwrap()[0],
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        second.dipole(DipoleAxis::Z).unwrap().energy_shift()[SHIFT_KEY],
        direct.dipole(DipoleAxis::Z).unwrap().energy_shift()[SHIFT_KEY],
        epsilon = 1e-10
    );
}

// ---------
// Rejection
// ---------

fn assert_active_space_error(params: ActiveSpaceParams) {
    let mol = restricted_model(model_coeff_alpha(), vec![]);
    let err = ActiveSpaceTransformer::new(params)
        .transform(&mol)
        .unwrap_err();
    assert!(
        err.downcast_ref::<ActiveSpaceError>().is_some(),
        "unexpected error: {err}"
    );
}

#[test]
fn test_active_space_rejects_odd_inactive_electrons() {
    assert_active_space_error(explicit_params(1, 2));
}

#[test]
fn test_active_space_rejects_too_many_active_electrons() {
    assert_active_space_error(explicit_params(6, 3));
}

#[test]
fn test_active_space_rejects_too_many_orbitals() {
    assert_active_space_error(explicit_params(2, 3));
}

#[test]
fn test_active_space_rejects_active_orbitals_length_mismatch() {
    let mut params = explicit_params(2, 2);
    params.active_orbitals = Some(vec![1]);
    assert_active_space_error(params);
}

#[test]
fn test_active_space_rejects_active_orbitals_out_of_range() {
    let mut params = explicit_params(2, 2);
    params.active_orbitals = Some(vec![1, 3]);
    assert_active_space_error(params);
}

#[test]
fn test_active_space_rejects_active_orbitals_electron_mismatch() {
    let mut params = explicit_params(2, 2);
    params.active_orbitals = Some(vec![0, 1]);
    assert_active_space_error(params);
}

#[test]
fn test_active_space_rejects_unresolvable_configuration() {
    let mol = h2_molecule();
    let err = ActiveSpaceTransformer::new(ActiveSpaceParams::default())
        .transform(&mol)
        .unwrap_err();
    assert!(err.downcast_ref::<ConfigurationError>().is_some());
}

// ----------
// Properties
// ----------

proptest! {
    #[test]
    fn test_active_space_full_space_identity(theta_01 in -1.5f64..1.5, theta_12 in -1.5f64..1.5) {
        let mol = restricted_model(givens(0, 1, theta_01).dot(&givens(1, 2, theta_12)), vec![]);
        let reduced = ActiveSpaceTransformer::new(explicit_params(4, 3))
            .transform(&mol)
            .unwrap();
        prop_assert!(reduced.energy_shift()[SHIFT_KEY].abs() < 1e-12);
        prop_assert!(reduced.dipole(DipoleAxis::Z).unwrap().energy_shift()[SHIFT_KEY].abs() < 1e-12);
        let diff_onee = (&reduced.mo_onee_ints()[0] - &mol.mo_onee_ints()[0])
            .mapv(f64::abs)
            .fold(0.0_f64, |acc, x| acc.max(*x));
        prop_assert!(diff_onee < 1e-10);
        let diff_twoe = (&reduced.mo_eri_ints().unwrap()[0] - &mol.mo_eri_ints().unwrap()[0])
            .mapv(f64::abs)
            .fold(0.0_f64, |acc, x| acc.max(*x));
        prop_assert!(diff_twoe < 1e-10);
    }

    #[test]
    fn test_active_space_conservation(
        theta_01 in -1.5f64..1.5,
        theta_02 in -1.5f64..1.5,
        (num_electrons, num_orbitals) in prop_oneof![Just((0usize, 1usize)), Just((2, 1)), Just((2, 2)), Just((4, 3))],
    ) {
        let mol = restricted_model(givens(0, 1, theta_01).dot(&givens(0, 2, theta_02)), vec![]);
        let transformer = ActiveSpaceTransformer::new(explicit_params(num_electrons, num_orbitals));
        let partition = transformer.partition(&mol).unwrap();
        prop_assert_eq!(partition.active().len(), num_orbitals);
        prop_assert_eq!(partition.active().len() + partition.inactive().len(), mol.num_orbitals());
        prop_assert!(partition.active().iter().all(|i| !partition.inactive().contains(i)));

        let reduced = transformer.transform(&mol).unwrap();
        prop_assert_eq!(reduced.num_electrons(), num_electrons);
        prop_assert_eq!(reduced.num_orbitals(), num_orbitals);
    }

    #[test]
    fn test_active_space_determinism(theta in -1.5f64..1.5) {
        let mol = restricted_model(givens(0, 2, theta), vec![]);
        let transformer = ActiveSpaceTransformer::new(explicit_params(2, 2));
        let first = transformer.transform(&mol).unwrap();
        let second = transformer.transform(&mol).unwrap();
        prop_assert_eq!(first.energy_shift(), second.energy_shift());
        prop_assert_eq!(&first.mo_onee_ints()[0], &second.mo_onee_ints()[0]);
        prop_assert_eq!(&first.mo_eri_ints().unwrap()[0], &second.mo_eri_ints().unwrap()[0]);
        prop_assert_eq!(first.hcore(), second.hcore());
    }
}

#[test]
fn test_active_space_does_not_mutate_input() {
    let mol = restricted_model(model_coeff_alpha(), vec![0]);
    let hcore_before: Array2<f64> = mol.hcore()[0].clone();
    let _ = ActiveSpaceTransformer::new(explicit_params(2, 2))
        .transform(&mol)
        .unwrap();
    assert_eq!(mol.hcore()[0], hcore_before);
    assert!(mol.energy_shift().is_empty());
    assert_eq!(mol.num_orbitals(), 3);
}

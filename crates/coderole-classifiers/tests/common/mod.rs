#![allow(dead_code)]

use coderole_classifiers::{Dataset, LabeledSample};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ten PHP snippets, two per role, each with a distinct normalized length.
pub fn ten_roles() -> Dataset {
    Dataset::from_labeled(vec![
        LabeledSample::new(
            "<?php namespace App\\Http\\Controllers; class HomeController extends Controller { public function index() { return view('home'); } }",
            "controller",
        ),
        LabeledSample::new(
            "<?php class PostController extends Controller { public function show($id) { return redirect('/posts'); } }",
            "controller",
        ),
        LabeledSample::new(
            "<?php use Illuminate\\Database\\Eloquent\\Model; class User extends Model { protected $fillable = ['name']; }",
            "model",
        ),
        LabeledSample::new(
            "<?php class Post extends Model { protected $table = 'posts'; public function user() { return $this->belongsTo(User::class); } }",
            "model",
        ),
        LabeledSample::new(
            "<?php class PaymentService { public function charge() { return true; } }",
            "service",
        ),
        LabeledSample::new(
            "<?php class MailService { private $mailer; public function handle() {} public function send() {} }",
            "service",
        ),
        LabeledSample::new(
            "<?php class AppServiceProvider extends ServiceProvider { public function register() { $this->app->singleton(Foo::class); } public function boot() {} }",
            "provider",
        ),
        LabeledSample::new(
            "<?php class RouteServiceProvider extends ServiceProvider { public function boot() { $this->app->bind('x', 'y'); } }",
            "provider",
        ),
        LabeledSample::new(
            "<?php class StoreUserRequest extends FormRequest { public function authorize() { return true; } public function rules() { return ['name' => 'required']; } }",
            "request",
        ),
        LabeledSample::new(
            "<?php class UpdatePostRequest extends FormRequest { public function rules() { return []; } }",
            "request",
        ),
    ])
}
